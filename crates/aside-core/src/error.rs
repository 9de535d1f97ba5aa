//! Validation errors for Aside domain types.
//!
//! Domain values are validated once, at construction, so the layers above
//! never have to re-check a key or a TTL.
//!
//! # Example
//!
//! ```
//! use aside_core::{CoreError, Key};
//!
//! let err = Key::new("   ").unwrap_err();
//! assert!(matches!(err, CoreError::InvalidKey { .. }));
//! ```

use thiserror::Error;

/// Error raised when a domain value fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The record key is empty or otherwise unusable.
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// A TTL value was rejected.
    #[error("Invalid TTL {seconds}s: {reason}")]
    InvalidTtl {
        /// The rejected number of seconds
        seconds: u64,
        /// Why it was rejected
        reason: String,
    },

    /// A record payload could not be interpreted.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl CoreError {
    /// Creates an InvalidKey error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidTtl error.
    pub fn invalid_ttl(seconds: u64, reason: impl Into<String>) -> Self {
        Self::InvalidTtl {
            seconds,
            reason: reason.into(),
        }
    }

    /// Creates an InvalidRecord error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord(message.into())
    }
}

/// Type alias for Results with CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
