//! Persistent store capability.

use aside_core::{Key, Record};
use async_trait::async_trait;

use crate::error::StoreError;

/// The system of record: keyed lookup of canonical records.
///
/// Implementations return `Ok(None)` when no record exists for the key and
/// reserve errors for real failures (connectivity, query errors, rows that
/// cannot be decoded).
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Looks up the record stored under `key`.
    async fn get(&self, key: &Key) -> Result<Option<Record>, StoreError>;

    /// Returns the name of this store, for logging and metrics.
    fn name(&self) -> &str;

    /// Releases the underlying connections. See [`CacheStore::close`].
    ///
    /// [`CacheStore::close`]: crate::CacheStore::close
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
