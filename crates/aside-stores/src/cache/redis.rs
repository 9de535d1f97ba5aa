//! Redis cache store.
//!
//! Uses `redis::aio::ConnectionManager` for a multiplexed connection with
//! automatic reconnection. Requires the `cache-redis` feature.

use aside_core::Ttl;
use async_trait::async_trait;
use parking_lot::RwLock;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::cache::{CacheStore, RedisConfig};
use crate::error::CacheStoreError;

/// Redis-backed cache store.
pub struct RedisCache {
    /// `None` once closed.
    connection_manager: RwLock<Option<ConnectionManager>>,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("connection_manager", &"ConnectionManager")
            .field("closed", &self.connection_manager.read().is_none())
            .finish()
    }
}

impl RedisCache {
    /// Connects to the server described by `config`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheStoreError> {
        let client = redis::Client::open(config.url().as_str()).map_err(|e| {
            CacheStoreError::connection(format!("failed to create Redis client: {}", e))
        })?;

        let timeout = config.connect_timeout();
        let connection_manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheStoreError::Timeout {
                millis: timeout.as_millis() as u64,
            })?
            .map_err(|e| CacheStoreError::connection(format!("failed to connect to Redis: {}", e)))?;

        debug!(url = %config.redacted_url(), "Redis cache store connected");

        Ok(Self {
            connection_manager: RwLock::new(Some(connection_manager)),
        })
    }

    fn connection(&self) -> Result<ConnectionManager, CacheStoreError> {
        self.connection_manager
            .read()
            .clone()
            .ok_or(CacheStoreError::Closed)
    }
}

fn map_redis_error(op: &str, e: redis::RedisError) -> CacheStoreError {
    if e.is_timeout() {
        CacheStoreError::Timeout { millis: 0 }
    } else if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
        CacheStoreError::connection(format!("Redis {} failed: {}", op, e))
    } else {
        CacheStoreError::backend(format!("Redis {} failed: {}", op, e))
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let mut conn = self.connection()?;
        let result: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("GET", e))?;

        if result.is_some() {
            debug!(key = key, "Cache HIT (redis)");
        } else {
            debug!(key = key, "Cache MISS (redis)");
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Ttl>) -> Result<(), CacheStoreError> {
        let mut conn = self.connection()?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs());
        }

        cmd.query_async::<()>(&mut conn)
            .await
            .map_err(|e| map_redis_error("SET", e))?;

        debug!(key = key, ttl = ?ttl, "Cache SET (redis)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        let mut conn = self.connection()?;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| map_redis_error("DEL", e))?;

        debug!(key = key, "Cache DEL (redis)");
        Ok(())
    }

    fn name(&self) -> &str {
        "redis"
    }

    async fn close(&self) -> Result<(), CacheStoreError> {
        // In-flight commands hold their own clone and finish first
        if self.connection_manager.write().take().is_some() {
            debug!("Redis cache store closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::warn;

    // Requires a running Redis; skipped when none answers on REDIS_HOST
    async fn connect_or_skip() -> Option<RedisCache> {
        let config = RedisConfig {
            host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            connect_timeout_secs: 1,
            ..RedisConfig::default()
        };
        match RedisCache::connect(&config).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Skipping Redis test (not available): {}", e);
                None
            },
        }
    }

    #[tokio::test]
    async fn test_redis_set_get_delete() {
        let Some(cache) = connect_or_skip().await else {
            return;
        };

        let ttl = Ttl::from_secs(60).unwrap();
        cache.set("aside:test:crud", b"{\"id\":1}", Some(ttl)).await.unwrap();
        assert_eq!(
            cache.get("aside:test:crud").await.unwrap(),
            Some(b"{\"id\":1}".to_vec())
        );

        cache.delete("aside:test:crud").await.unwrap();
        assert_eq!(cache.get("aside:test:crud").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_close_releases_connection() {
        let Some(cache) = connect_or_skip().await else {
            return;
        };

        cache.close().await.unwrap();

        assert!(cache.connection_manager.read().is_none());
        assert!(matches!(cache.get("k").await, Err(CacheStoreError::Closed)));
        // Closing twice is fine
        cache.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_to_connect() {
        let config = RedisConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_secs: 1,
            ..RedisConfig::default()
        };

        let err = RedisCache::connect(&config).await.unwrap_err();
        assert!(err.is_transient());
    }
}
