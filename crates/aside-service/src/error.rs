//! Error types of the cache-aside service.
//!
//! Callers of [`CacheAsideService::get`](crate::CacheAsideService::get) only
//! ever see [`ServiceError`]. Cache problems are described by
//! [`CacheUnavailable`], which the service logs and counts but never returns.

use aside_core::Key;
use aside_stores::{CacheStoreError, StoreError};
use thiserror::Error;

use crate::codec::CodecError;

/// Failure of a `get` call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The persistent store could not answer.
    #[error("persistent store failed for key '{key}': {source}")]
    StoreFailure {
        /// The requested key
        key: String,
        /// The store's error
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Creates a StoreFailure error.
    pub fn store_failure(key: &Key, source: StoreError) -> Self {
        Self::StoreFailure {
            key: key.as_str().to_string(),
            source,
        }
    }

    /// Returns true if retrying the call might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::StoreFailure { source, .. } => source.is_transient(),
        }
    }
}

/// A cache failure the service recovered from.
#[derive(Debug, Error)]
pub enum CacheUnavailable {
    /// Reading the cache failed.
    #[error("cache read failed: {0}")]
    Read(#[source] CacheStoreError),

    /// The cached payload could not be decoded.
    #[error("cached entry is corrupt: {0}")]
    Corrupt(#[source] CodecError),

    /// The record could not be encoded for caching.
    #[error("record could not be encoded: {0}")]
    Encode(#[source] CodecError),

    /// Writing the cache failed.
    #[error("cache write failed: {0}")]
    Write(#[source] CacheStoreError),
}

impl CacheUnavailable {
    /// Returns the metric label of this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read(_) => "read",
            Self::Corrupt(_) => "corrupt",
            Self::Encode(_) => "encode",
            Self::Write(_) => "write",
        }
    }
}

/// Error returned by [`CacheAsideServiceBuilder::build`](crate::CacheAsideServiceBuilder::build).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A required component was not provided.
    #[error("{0} is required")]
    Missing(&'static str),

    /// The namespace cannot prefix cache keys.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_store_failure_display_and_source() {
        let key = Key::new("u:7").unwrap();
        let err = ServiceError::store_failure(&key, StoreError::connection("refused"));

        assert_eq!(
            err.to_string(),
            "persistent store failed for key 'u:7': store connection error: refused"
        );
        assert!(err.source().is_some());
        assert!(err.is_transient());
    }

    #[test]
    fn test_query_failure_is_not_transient() {
        let key = Key::new("u:7").unwrap();
        let err = ServiceError::store_failure(&key, StoreError::query("u:7", "syntax error"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_cache_unavailable_kinds() {
        assert_eq!(CacheUnavailable::Read(CacheStoreError::Closed).kind(), "read");
        assert_eq!(
            CacheUnavailable::Write(CacheStoreError::backend("OOM")).kind(),
            "write"
        );

        let codec_err = crate::codec::decode(b"nope").unwrap_err();
        assert_eq!(CacheUnavailable::Corrupt(codec_err).kind(), "corrupt");
    }
}
