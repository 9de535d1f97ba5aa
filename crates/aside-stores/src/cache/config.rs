//! Connection settings for the networked cache backends.
//!
//! These types are always compiled so settings files can describe a backend
//! even when the crate was built without the matching feature; the factory
//! reports the missing feature at construction time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aside_core::Ttl;
use serde::Deserialize;

use crate::error::CacheStoreError;

/// Longest exptime memcached treats as relative; larger values are read as
/// an absolute Unix timestamp.
pub const MEMCACHED_MAX_RELATIVE_EXPTIME: u64 = 60 * 60 * 24 * 30;

/// Connection settings for a Redis (or Redis-compatible) server.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Logical database index.
    pub db: i64,
    /// Optional password (AUTH).
    pub password: Option<String>,
    /// Time allowed to establish the connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            password: None,
            connect_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    /// Returns the connection URL, with the password percent-encoded.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(password),
                self.host,
                self.port,
                self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Returns the connection URL with the password masked, for logging.
    pub fn redacted_url(&self) -> String {
        match &self.password {
            Some(_) => format!("redis://:***@{}:{}/{}", self.host, self.port, self.db),
            None => self.url(),
        }
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Connection settings for Memcached.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemcachedConfig {
    /// Servers as `host:port`, tried in order until one accepts.
    pub servers: Vec<String>,
}

impl Default for MemcachedConfig {
    fn default() -> Self {
        Self {
            servers: vec!["127.0.0.1:11211".to_string()],
        }
    }
}

impl MemcachedConfig {
    /// Returns the servers as `tcp://` DSNs.
    pub fn dsns(&self) -> Vec<String> {
        self.servers
            .iter()
            .map(|server| {
                if server.contains("://") {
                    server.clone()
                } else {
                    format!("tcp://{}", server)
                }
            })
            .collect()
    }
}

/// Converts a TTL into a memcached exptime as of `now`.
///
/// `None` maps to `0` (no expiry). TTLs up to 30 days are sent as relative
/// seconds; longer ones as the absolute Unix time they expire at.
#[cfg_attr(not(feature = "cache-memcached"), allow(dead_code))]
pub(crate) fn memcached_exptime(ttl: Option<Ttl>, now: SystemTime) -> Result<i64, CacheStoreError> {
    let Some(ttl) = ttl else {
        return Ok(0);
    };
    let seconds = ttl.as_secs();

    let exptime = if seconds <= MEMCACHED_MAX_RELATIVE_EXPTIME {
        seconds
    } else {
        let since_epoch = now
            .duration_since(UNIX_EPOCH)
            .map_err(|e| {
                CacheStoreError::backend(format!("system clock before Unix epoch: {}", e))
            })?
            .as_secs();
        since_epoch.checked_add(seconds).ok_or_else(|| {
            CacheStoreError::backend(format!("TTL of {}s overflows the memcached exptime", seconds))
        })?
    };

    i64::try_from(exptime).map_err(|_| {
        CacheStoreError::backend(format!("TTL of {}s overflows the memcached exptime", seconds))
    })
}
