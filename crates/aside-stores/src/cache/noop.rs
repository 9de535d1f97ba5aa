//! Cache store that never holds anything.

use aside_core::Ttl;
use async_trait::async_trait;
use tracing::trace;

use crate::cache::CacheStore;
use crate::error::CacheStoreError;

/// A cache that always misses and accepts every write.
///
/// Lets the service run against the persistent store alone, for example
/// when caching is switched off in the settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        trace!(key = key, "Cache MISS (noop)");
        Ok(None)
    }

    async fn set(&self, key: &str, _value: &[u8], _ttl: Option<Ttl>) -> Result<(), CacheStoreError> {
        trace!(key = key, "Cache SET ignored (noop)");
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheStoreError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
