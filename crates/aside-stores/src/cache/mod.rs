//! Cache store capability and its adapters.

mod config;
mod memory;
mod noop;
mod traits;

#[cfg(feature = "cache-memcached")]
mod memcached;
#[cfg(feature = "cache-redis")]
mod redis;

pub use config::{MemcachedConfig, RedisConfig};
pub use memory::{MemoryCache, MemoryCacheConfig};
pub use noop::NoopCache;
pub use traits::CacheStore;

#[cfg(feature = "cache-memcached")]
pub use memcached::MemcachedCache;
#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCache;
