//! Aside Service - cache-aside read path over pluggable stores
//!
//! [`CacheAsideService`] answers "get record by key" from a cache store when
//! it can, falls back to the persistent store when it must, and keeps the
//! cache populated on the way back. Cache failures never reach the caller.
//!
//! ```no_run
//! use aside_core::Key;
//! use aside_service::{CacheAsideService, settings};
//! use aside_stores::{create_cache, create_store};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let settings = settings::load(None)?;
//! let cache = create_cache(&settings.cache).await?;
//! let store = create_store(&settings.store).await?;
//!
//! let service = CacheAsideService::builder()
//!     .cache(cache.clone())
//!     .store(store.clone())
//!     .default_ttl(settings.service.default_ttl)
//!     .namespace(settings.service.namespace)
//!     .build()?;
//!
//! let record = service.get(&Key::new("u:7")?, None).await?;
//! println!("{:?}", record);
//!
//! cache.close().await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod keys;
pub mod logging;
pub mod metrics;
pub mod service;
pub mod settings;

pub use error::{BuildError, CacheUnavailable, ServiceError};
pub use keys::CacheKey;
pub use metrics::CacheAsideMetrics;
pub use service::{CacheAsideService, CacheAsideServiceBuilder};
pub use settings::{Settings, SettingsError};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
