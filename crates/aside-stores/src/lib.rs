//! # Aside Stores
//!
//! The two capabilities the cache-aside service is built on, and the
//! adapters that provide them.
//!
//! - [`CacheStore`]: key/value get/set/delete with optional expiry.
//! - [`PersistentStore`]: keyed lookup of canonical records.
//!
//! ## Adapters
//!
//! | adapter | capability | feature |
//! |---|---|---|
//! | [`MemoryCache`] (Moka) | cache | always |
//! | [`NoopCache`] | cache | always |
//! | `RedisCache` | cache | `cache-redis` |
//! | `MemcachedCache` | cache | `cache-memcached` |
//! | [`MemoryStore`] | store | always |
//! | `PostgresStore` (sqlx) | store | `postgres` |
//!
//! ## Example
//!
//! ```ignore
//! use aside_stores::{CacheBackend, StoreBackend, create_cache, create_store};
//!
//! let cache = create_cache(&CacheBackend::Memory(Default::default())).await?;
//! let store = create_store(&StoreBackend::Memory { seed: None }).await?;
//! ```

pub mod cache;
pub mod error;
pub mod factory;
pub mod store;

// Re-exports
pub use cache::{CacheStore, MemcachedConfig, MemoryCache, MemoryCacheConfig, NoopCache, RedisConfig};
pub use error::{CacheStoreError, StoreError};
pub use factory::{
    CacheBackend, CacheKind, FactoryError, StoreBackend, StoreKind, create_cache,
    create_cache_or_noop, create_store,
};
pub use store::{DatabaseConfig, DatabaseConfigBuilder, DatabaseConfigError, MemoryStore, PersistentStore};

#[cfg(feature = "cache-memcached")]
pub use cache::MemcachedCache;
#[cfg(feature = "cache-redis")]
pub use cache::RedisCache;
#[cfg(feature = "postgres")]
pub use store::PostgresStore;

// Re-export aside_core for consumers
pub use aside_core;
