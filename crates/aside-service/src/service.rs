//! The cache-aside read path.

use std::sync::Arc;
use std::time::Instant;

use aside_core::{Key, Record, Ttl};
use aside_stores::{CacheStore, PersistentStore};
use tracing::{debug, error, instrument, warn};

use crate::codec;
use crate::error::{BuildError, CacheUnavailable, ServiceError};
use crate::keys::{CacheKey, DEFAULT_NAMESPACE, validate_namespace};
use crate::metrics::CacheAsideMetrics;

/// Read-through access to records, with the cache consulted first.
///
/// The cache is strictly an accelerator: any cache failure (unreachable
/// backend, corrupt entry, failed write) degrades to a store read and is
/// logged and counted, never returned. Only persistent store failures reach
/// the caller.
///
/// Each `get` is independent. Concurrent misses on the same key each read
/// the store and each write the cache; requests are not coalesced and
/// absent keys are not cached.
///
/// The service does not own its stores' lifecycles: whoever created the
/// handles closes them.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use aside_core::{Key, Ttl};
/// use aside_service::CacheAsideService;
/// use aside_stores::{MemoryCache, MemoryStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = CacheAsideService::new(
///     Arc::new(MemoryCache::default()),
///     Arc::new(MemoryStore::new()),
///     Ttl::from_secs(3600)?,
/// );
///
/// match service.get(&Key::new("u:7")?, None).await? {
///     Some(record) => println!("found {} fields", record.len()),
///     None => println!("not found"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CacheAsideService {
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn PersistentStore>,
    default_ttl: Ttl,
    namespace: Arc<str>,
    metrics: CacheAsideMetrics,
}

impl std::fmt::Debug for CacheAsideService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAsideService")
            .field("cache", &self.cache.name())
            .field("store", &self.store.name())
            .field("default_ttl", &self.default_ttl)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl CacheAsideService {
    /// Creates a service using the default namespace.
    pub fn new(
        cache: Arc<dyn CacheStore>,
        store: Arc<dyn PersistentStore>,
        default_ttl: Ttl,
    ) -> Self {
        Self {
            cache,
            store,
            default_ttl,
            namespace: Arc::from(DEFAULT_NAMESPACE),
            metrics: CacheAsideMetrics::new(),
        }
    }

    /// Creates a new builder.
    pub fn builder() -> CacheAsideServiceBuilder {
        CacheAsideServiceBuilder::default()
    }

    /// Returns the TTL used when `get` receives no override.
    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    /// Returns the namespace prefixed to cache keys.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the metrics recorder.
    pub fn metrics(&self) -> &CacheAsideMetrics {
        &self.metrics
    }

    /// Returns the cache key under which `key` is stored.
    pub fn cache_key(&self, key: &Key) -> CacheKey {
        CacheKey::derive(&self.namespace, key)
    }

    /// Gets the record stored under `key`.
    ///
    /// Returns `Ok(None)` when neither the cache nor the store has it. A
    /// record read from the store is written to the cache with
    /// `ttl_override`, or the default TTL, before being returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::StoreFailure`] when the persistent store
    /// fails. Cache failures are never returned.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn get(
        &self,
        key: &Key,
        ttl_override: Option<Ttl>,
    ) -> Result<Option<Record>, ServiceError> {
        let start = Instant::now();
        let cache_key = self.cache_key(key);

        match self.read_cached(&cache_key).await {
            Ok(Some(record)) => {
                self.metrics.record_hit();
                self.metrics.record_get_duration("hit", start.elapsed());
                debug!(cache_key = %cache_key, "Cache hit");
                return Ok(Some(record));
            },
            Ok(None) => {
                self.metrics.record_miss();
                debug!(cache_key = %cache_key, "Cache miss");
            },
            Err(failure) => {
                self.metrics.record_miss();
                self.note_cache_failure(&cache_key, &failure);
            },
        }

        self.metrics.record_store_read();
        let fetched = match self.store.get(key).await {
            Ok(fetched) => fetched,
            Err(source) => {
                self.metrics.record_store_failure();
                self.metrics
                    .record_get_duration("store_failure", start.elapsed());
                error!(store = self.store.name(), error = %source, "Persistent store lookup failed");
                return Err(ServiceError::store_failure(key, source));
            },
        };

        let Some(record) = fetched else {
            self.metrics.record_not_found();
            self.metrics.record_get_duration("not_found", start.elapsed());
            debug!("Record not found in persistent store");
            return Ok(None);
        };

        let ttl = ttl_override.unwrap_or(self.default_ttl);
        match self.populate(&cache_key, &record, ttl).await {
            Ok(()) => {
                self.metrics.record_population();
                debug!(cache_key = %cache_key, ttl_seconds = ttl.as_secs(), "Record cached");
            },
            Err(failure) => self.note_cache_failure(&cache_key, &failure),
        }

        self.metrics.record_get_duration("miss", start.elapsed());
        Ok(Some(record))
    }

    /// Reads and decodes the cached entry, if any.
    async fn read_cached(&self, cache_key: &CacheKey) -> Result<Option<Record>, CacheUnavailable> {
        let Some(bytes) = self
            .cache
            .get(cache_key.as_str())
            .await
            .map_err(CacheUnavailable::Read)?
        else {
            return Ok(None);
        };

        codec::decode(&bytes)
            .map(Some)
            .map_err(CacheUnavailable::Corrupt)
    }

    /// Encodes and writes the record; the caller keeps the original.
    async fn populate(
        &self,
        cache_key: &CacheKey,
        record: &Record,
        ttl: Ttl,
    ) -> Result<(), CacheUnavailable> {
        let bytes = codec::encode(record).map_err(CacheUnavailable::Encode)?;
        self.cache
            .set(cache_key.as_str(), &bytes, Some(ttl))
            .await
            .map_err(CacheUnavailable::Write)
    }

    fn note_cache_failure(&self, cache_key: &CacheKey, failure: &CacheUnavailable) {
        self.metrics.record_cache_error(failure.kind());
        warn!(
            cache = self.cache.name(),
            cache_key = %cache_key,
            kind = failure.kind(),
            error = %failure,
            "Cache unavailable, continuing without it"
        );
    }
}

/// Builder for [`CacheAsideService`].
#[derive(Default)]
pub struct CacheAsideServiceBuilder {
    cache: Option<Arc<dyn CacheStore>>,
    store: Option<Arc<dyn PersistentStore>>,
    default_ttl: Option<Ttl>,
    namespace: Option<String>,
    metrics: Option<CacheAsideMetrics>,
}

impl CacheAsideServiceBuilder {
    /// Sets the cache store.
    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the persistent store.
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the default TTL.
    pub fn default_ttl(mut self, ttl: Ttl) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Sets the cache key namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Shares an existing metrics recorder.
    pub fn metrics(mut self, metrics: CacheAsideMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache, the store or the default TTL is
    /// missing, or if the namespace is invalid.
    pub fn build(self) -> Result<CacheAsideService, BuildError> {
        let cache = self.cache.ok_or(BuildError::Missing("cache store"))?;
        let store = self.store.ok_or(BuildError::Missing("persistent store"))?;
        let default_ttl = self.default_ttl.ok_or(BuildError::Missing("default TTL"))?;

        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        validate_namespace(&namespace).map_err(BuildError::InvalidNamespace)?;

        Ok(CacheAsideService {
            cache,
            store,
            default_ttl,
            namespace: Arc::from(namespace),
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}
