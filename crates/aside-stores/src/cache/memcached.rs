//! Memcached cache store.
//!
//! Requires the `cache-memcached` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use aside_core::Ttl;
use async_memcached::Client;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::config::memcached_exptime;
use crate::cache::{CacheStore, MemcachedConfig};
use crate::error::CacheStoreError;

/// Memcached-backed cache store.
///
/// The client is a single connection, so requests are serialized behind a
/// mutex. A missing TTL is sent as `0`, which memcached reads as "never
/// expires".
pub struct MemcachedCache {
    client: Arc<Mutex<Client>>,
    server: String,
    closed: AtomicBool,
}

impl std::fmt::Debug for MemcachedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemcachedCache")
            .field("server", &self.server)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemcachedCache {
    /// Connects to the first reachable server in `config`.
    pub async fn connect(config: &MemcachedConfig) -> Result<Self, CacheStoreError> {
        let mut last_error = None;

        for dsn in config.dsns() {
            match Client::new(&dsn).await {
                Ok(client) => {
                    debug!(server = %dsn, "Memcached cache store connected");
                    return Ok(Self {
                        client: Arc::new(Mutex::new(client)),
                        server: dsn,
                        closed: AtomicBool::new(false),
                    });
                },
                Err(e) => {
                    warn!(server = %dsn, error = %e, "Memcached server unreachable");
                    last_error = Some(format!("{}: {}", dsn, e));
                },
            }
        }

        Err(CacheStoreError::connection(format!(
            "failed to connect to memcached: {}",
            last_error.unwrap_or_else(|| "no servers configured".to_string())
        )))
    }

    fn ensure_open(&self) -> Result<(), CacheStoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheStoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemcachedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        self.ensure_open()?;
        let mut client = self.client.lock().await;

        let result = client
            .get(key)
            .await
            .map_err(|e| CacheStoreError::backend(format!("Memcached GET failed: {}", e)))?;

        match result {
            Some(value) => {
                debug!(key = key, "Cache HIT (memcached)");
                Ok(Some(value.data))
            },
            None => {
                debug!(key = key, "Cache MISS (memcached)");
                Ok(None)
            },
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Ttl>) -> Result<(), CacheStoreError> {
        self.ensure_open()?;
        let exptime = memcached_exptime(ttl, SystemTime::now())?;
        let mut client = self.client.lock().await;

        client
            .set(key, value, Some(exptime), None)
            .await
            .map_err(|e| CacheStoreError::backend(format!("Memcached SET failed: {}", e)))?;

        debug!(key = key, exptime = exptime, "Cache SET (memcached)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        self.ensure_open()?;
        let mut client = self.client.lock().await;

        // Memcached reports NOT_FOUND as an error; a missing key is fine here.
        if let Err(e) = client.delete(key).await {
            debug!(key = key, error = %e, "Memcached DEL did not remove a key");
        }

        debug!(key = key, "Cache DEL (memcached)");
        Ok(())
    }

    fn name(&self) -> &str {
        "memcached"
    }

    async fn close(&self) -> Result<(), CacheStoreError> {
        self.closed.store(true, Ordering::Release);
        debug!(server = %self.server, "Memcached cache store closed");
        Ok(())
    }
}
