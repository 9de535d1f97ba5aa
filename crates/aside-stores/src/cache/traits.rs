//! Cache store capability.

use aside_core::Ttl;
use async_trait::async_trait;

use crate::error::CacheStoreError;

/// A key/value cache with optional per-entry expiry.
///
/// This is the only view the cache-aside service has of a cache backend
/// (in-memory, Redis, Memcached, ...). Values are opaque bytes; the service
/// owns the encoding.
///
/// A missing key is a normal `Ok(None)`; errors are reserved for the
/// backend being unreachable or misbehaving.
///
/// # Example
///
/// ```ignore
/// use aside_stores::{CacheStore, CacheStoreError};
///
/// struct MyCache;
///
/// #[async_trait]
/// impl CacheStore for MyCache {
///     async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
///         Ok(None)
///     }
///
///     async fn set(&self, key: &str, value: &[u8], ttl: Option<Ttl>) -> Result<(), CacheStoreError> {
///         Ok(())
///     }
///
///     async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "my-cache"
///     }
/// }
/// ```
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError>;

    /// Stores `value` under `key`.
    ///
    /// `ttl` of `None` leaves expiry to the backend convention (its default
    /// TTL, or no expiry).
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Ttl>) -> Result<(), CacheStoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheStoreError>;

    /// Returns the name of this backend, for logging and metrics.
    fn name(&self) -> &str;

    /// Releases the underlying connections.
    ///
    /// Dropping the handle also releases them; `close` exists so an owner
    /// can release deterministically and observe errors on shutdown.
    async fn close(&self) -> Result<(), CacheStoreError> {
        Ok(())
    }
}
