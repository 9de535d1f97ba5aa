//! Error types for the cache and persistent store capabilities.

/// Errors reported by a [`CacheStore`](crate::CacheStore) backend.
///
/// Every variant describes the cache being unavailable in some way. The
/// cache-aside service downgrades all of them to a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheStoreError {
    /// Could not reach the cache backend.
    #[error("cache connection error: {0}")]
    Connection(String),

    /// The backend answered with an error.
    #[error("cache backend error: {0}")]
    Backend(String),

    /// The operation did not complete in time.
    #[error("cache operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The handle was closed and can no longer be used.
    #[error("cache store is closed")]
    Closed,
}

impl CacheStoreError {
    /// Creates a new connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a new backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout { .. })
    }
}

/// Errors reported by a [`PersistentStore`](crate::PersistentStore).
///
/// "Record not found" is not an error; stores return `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not reach the database.
    #[error("store connection error: {0}")]
    Connection(String),

    /// The lookup query failed.
    #[error("query failed for key '{key}': {reason}")]
    Query { key: String, reason: String },

    /// The row was found but could not be turned into a record.
    #[error("invalid record for key '{key}': {reason}")]
    Decode { key: String, reason: String },

    /// The operation did not complete in time.
    #[error("store operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The handle was closed and can no longer be used.
    #[error("persistent store is closed")]
    Closed,

    /// An I/O error occurred while loading store data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Creates a new connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a new query error.
    pub fn query(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Query {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new decode error.
    pub fn decode(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout { .. })
    }
}
