//! In-process cache store using Moka.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use aside_core::Ttl;
use async_trait::async_trait;
use metrics::counter;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use serde::Deserialize;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::CacheStoreError;

/// Configuracion del cache en memoria.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryCacheConfig {
    /// Maximo numero de entries (default: 10000)
    pub max_capacity: u64,
    /// TTL aplicado cuando `set` no recibe uno (default: sin expiracion)
    pub default_ttl: Option<Ttl>,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            default_ttl: None,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedValue {
    bytes: Arc<[u8]>,
    ttl: Option<Duration>,
}

/// Expiry por entry: cada `set` define su propio TTL.
struct EntryExpiry {
    default_ttl: Option<Duration>,
}

impl Expiry<String, CachedValue> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }
}

/// Cache store en memoria del proceso.
/// Thread-safe y async-friendly; no es distribuido.
///
/// # Examples
///
/// ```no_run
/// use aside_stores::{CacheStore, MemoryCache, MemoryCacheConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = MemoryCache::new(MemoryCacheConfig::default());
/// cache.set("aside:u:7", br#"{"id":7}"#, None).await.unwrap();
///
/// if let Some(bytes) = cache.get("aside:u:7").await.unwrap() {
///     println!("Cache hit: {} bytes", bytes.len());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, CachedValue>,
    closed: Arc<AtomicBool>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("max_capacity", &self.inner.policy().max_capacity())
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl MemoryCache {
    /// Crea un nuevo cache con la configuracion dada.
    pub fn new(config: MemoryCacheConfig) -> Self {
        let expiry = EntryExpiry {
            default_ttl: config.default_ttl.map(|ttl| ttl.as_duration()),
        };

        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(expiry)
            .eviction_listener(|_key, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                counter!("aside_memory_cache_evictions_total", "reason" => reason).increment(1);
            })
            .build();

        debug!(
            max_capacity = config.max_capacity,
            default_ttl = ?config.default_ttl,
            "Memory cache store created"
        );

        Self {
            inner,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Fuerza la limpieza de entries expiradas (para tests principalmente).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    fn ensure_open(&self) -> Result<(), CacheStoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheStoreError::Closed);
        }
        Ok(())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(MemoryCacheConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        self.ensure_open()?;
        let result = self.inner.get(key).await.map(|value| value.bytes.to_vec());

        if result.is_some() {
            debug!(key = key, "Cache HIT (memory)");
        } else {
            debug!(key = key, "Cache MISS (memory)");
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Ttl>) -> Result<(), CacheStoreError> {
        self.ensure_open()?;
        let entry = CachedValue {
            bytes: Arc::from(value),
            ttl: ttl.map(|t| t.as_duration()),
        };
        self.inner.insert(key.to_string(), entry).await;

        debug!(key = key, ttl = ?ttl, "Cache SET (memory)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        self.ensure_open()?;
        self.inner.invalidate(key).await;
        debug!(key = key, "Cache DEL (memory)");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    async fn close(&self) -> Result<(), CacheStoreError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.inner.invalidate_all();
            debug!("Memory cache store closed");
        }
        Ok(())
    }
}
