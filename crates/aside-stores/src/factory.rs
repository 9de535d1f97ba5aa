//! Backend selection by kind.
//!
//! Turns a backend description (usually coming from settings) into a shared
//! capability handle. Backends whose cargo feature is disabled are reported
//! as such instead of silently falling back to another backend.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{
    CacheStore, MemcachedConfig, MemoryCache, MemoryCacheConfig, NoopCache, RedisConfig,
};
use crate::error::{CacheStoreError, StoreError};
use crate::store::{DatabaseConfig, MemoryStore, PersistentStore};

/// Errors raised while building a backend.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The backend kind is not known.
    #[error("unsupported {capability} type: {kind}")]
    Unsupported {
        capability: &'static str,
        kind: String,
    },

    /// The backend exists but this build does not include it.
    #[error("{capability} type '{kind}' requires the '{feature}' feature")]
    FeatureDisabled {
        capability: &'static str,
        kind: &'static str,
        feature: &'static str,
    },

    /// The cache backend could not be initialized.
    #[error(transparent)]
    Cache(#[from] CacheStoreError),

    /// The persistent store could not be initialized.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Supported cache backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Memory,
    Noop,
    Redis,
    Memcached,
}

impl CacheKind {
    /// Returns the canonical name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Noop => "noop",
            Self::Redis => "redis",
            Self::Memcached => "memcached",
        }
    }
}

impl FromStr for CacheKind {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "moka" => Ok(Self::Memory),
            "noop" | "none" | "disabled" => Ok(Self::Noop),
            "redis" => Ok(Self::Redis),
            "memcached" | "memcache" => Ok(Self::Memcached),
            _ => Err(FactoryError::Unsupported {
                capability: "cache",
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported persistent stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Postgres,
}

impl StoreKind {
    /// Returns the canonical name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for StoreKind {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(FactoryError::Unsupported {
                capability: "store",
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully described cache backend.
#[derive(Debug, Clone)]
pub enum CacheBackend {
    Memory(MemoryCacheConfig),
    Noop,
    Redis(RedisConfig),
    Memcached(MemcachedConfig),
}

impl CacheBackend {
    /// Returns the kind of this backend.
    pub fn kind(&self) -> CacheKind {
        match self {
            Self::Memory(_) => CacheKind::Memory,
            Self::Noop => CacheKind::Noop,
            Self::Redis(_) => CacheKind::Redis,
            Self::Memcached(_) => CacheKind::Memcached,
        }
    }
}

/// A fully described persistent store.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// In-memory store, optionally seeded from a JSON file.
    Memory { seed: Option<PathBuf> },
    Postgres(DatabaseConfig),
}

impl StoreBackend {
    /// Returns the kind of this backend.
    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Memory { .. } => StoreKind::Memory,
            Self::Postgres(_) => StoreKind::Postgres,
        }
    }
}

/// Builds the cache store described by `backend`.
///
/// # Errors
///
/// Fails if the backend's feature is disabled or the backend cannot be
/// reached.
pub async fn create_cache(backend: &CacheBackend) -> Result<Arc<dyn CacheStore>, FactoryError> {
    let cache: Arc<dyn CacheStore> = match backend {
        CacheBackend::Memory(config) => Arc::new(MemoryCache::new(config.clone())),
        CacheBackend::Noop => Arc::new(NoopCache),
        CacheBackend::Redis(config) => create_redis(config).await?,
        CacheBackend::Memcached(config) => create_memcached(config).await?,
    };

    info!(backend = cache.name(), "Cache store ready");
    Ok(cache)
}

/// Builds the cache store described by `backend`, running without a cache
/// when the backend cannot be reached.
///
/// An unreachable cache must not keep records from being served, so a
/// [`FactoryError::Cache`] degrades to [`NoopCache`] with a warning.
/// Misconfiguration (unknown kind, disabled feature) is still an error.
///
/// # Errors
///
/// Fails only if the backend's feature is disabled.
pub async fn create_cache_or_noop(
    backend: &CacheBackend,
) -> Result<Arc<dyn CacheStore>, FactoryError> {
    degrade_unreachable(backend.kind(), create_cache(backend).await)
}

fn degrade_unreachable(
    kind: CacheKind,
    result: Result<Arc<dyn CacheStore>, FactoryError>,
) -> Result<Arc<dyn CacheStore>, FactoryError> {
    match result {
        Err(FactoryError::Cache(e)) => {
            warn!(
                backend = %kind,
                error = %e,
                "Cache store unreachable, continuing without cache"
            );
            Ok(Arc::new(NoopCache))
        },
        other => other,
    }
}

/// Builds the persistent store described by `backend`.
///
/// # Errors
///
/// Fails if the backend's feature is disabled, the seed file cannot be
/// loaded, or the database cannot be reached.
pub async fn create_store(backend: &StoreBackend) -> Result<Arc<dyn PersistentStore>, FactoryError> {
    let store: Arc<dyn PersistentStore> = match backend {
        StoreBackend::Memory { seed: Some(path) } => Arc::new(MemoryStore::from_json_file(path).await?),
        StoreBackend::Memory { seed: None } => Arc::new(MemoryStore::new()),
        StoreBackend::Postgres(config) => create_postgres(config).await?,
    };

    info!(backend = store.name(), "Persistent store ready");
    Ok(store)
}

#[cfg(feature = "cache-redis")]
async fn create_redis(config: &RedisConfig) -> Result<Arc<dyn CacheStore>, FactoryError> {
    Ok(Arc::new(crate::cache::RedisCache::connect(config).await?))
}

#[cfg(not(feature = "cache-redis"))]
async fn create_redis(_config: &RedisConfig) -> Result<Arc<dyn CacheStore>, FactoryError> {
    Err(FactoryError::FeatureDisabled {
        capability: "cache",
        kind: "redis",
        feature: "cache-redis",
    })
}

#[cfg(feature = "cache-memcached")]
async fn create_memcached(config: &MemcachedConfig) -> Result<Arc<dyn CacheStore>, FactoryError> {
    Ok(Arc::new(crate::cache::MemcachedCache::connect(config).await?))
}

#[cfg(not(feature = "cache-memcached"))]
async fn create_memcached(_config: &MemcachedConfig) -> Result<Arc<dyn CacheStore>, FactoryError> {
    Err(FactoryError::FeatureDisabled {
        capability: "cache",
        kind: "memcached",
        feature: "cache-memcached",
    })
}

#[cfg(feature = "postgres")]
async fn create_postgres(config: &DatabaseConfig) -> Result<Arc<dyn PersistentStore>, FactoryError> {
    Ok(Arc::new(crate::store::PostgresStore::connect(config).await?))
}

#[cfg(not(feature = "postgres"))]
async fn create_postgres(_config: &DatabaseConfig) -> Result<Arc<dyn PersistentStore>, FactoryError> {
    Err(FactoryError::FeatureDisabled {
        capability: "store",
        kind: "postgres",
        feature: "postgres",
    })
}
