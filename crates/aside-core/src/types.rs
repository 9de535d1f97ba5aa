//! Validated newtypes for record keys and expirations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Identifier of a record in the persistent store.
///
/// Keys are opaque to the service; the only rule is that a key is not
/// empty or whitespace-only. The original text is kept as-is (no trimming),
/// so the same key reaches both the cache and the store.
///
/// # Example
///
/// ```
/// use aside_core::Key;
///
/// let key = Key::new("u:7").unwrap();
/// assert_eq!(key.as_str(), "u:7");
/// assert!(Key::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Creates a new key, rejecting empty or whitespace-only values.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(CoreError::invalid_key(key, "key cannot be empty"));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Key {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Key {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Key::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Time-to-live of a cache entry, in whole seconds.
///
/// A TTL is always positive: "no expiry" is expressed by the absence of a
/// TTL (`Option<Ttl>`), never by zero.
///
/// # Example
///
/// ```
/// use aside_core::Ttl;
///
/// let ttl = Ttl::from_secs(3600).unwrap();
/// assert_eq!(ttl.as_secs(), 3600);
/// assert!(Ttl::from_secs(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ttl(NonZeroU64);

impl Ttl {
    /// Creates a TTL from a number of seconds. Zero is rejected.
    pub fn from_secs(seconds: u64) -> Result<Self> {
        NonZeroU64::new(seconds)
            .map(Self)
            .ok_or_else(|| CoreError::invalid_ttl(seconds, "TTL must be a positive number of seconds"))
    }

    /// Returns the TTL in seconds.
    pub fn as_secs(&self) -> u64 {
        self.0.get()
    }

    /// Returns the TTL as a `Duration`.
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0.get())
    }
}

impl From<NonZeroU64> for Ttl {
    fn from(seconds: NonZeroU64) -> Self {
        Self(seconds)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl Serialize for Ttl {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.as_secs())
    }
}

impl<'de> Deserialize<'de> for Ttl {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Ttl::from_secs(seconds).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rejects_blank() {
        assert!(Key::new("").is_err());
        assert!(Key::new("  \t").is_err());
        assert!(Key::new("u:7").is_ok());
    }

    #[test]
    fn test_key_keeps_original_text() {
        let key = Key::new(" padded ").unwrap();
        assert_eq!(key.as_str(), " padded ");
        assert_eq!(key.to_string(), " padded ");
    }

    #[test]
    fn test_key_deserialize_validates() {
        let key: Key = serde_json::from_str(r#""orders:1""#).unwrap();
        assert_eq!(key.as_str(), "orders:1");

        let err = serde_json::from_str::<Key>(r#""""#);
        assert!(err.is_err());
    }

    #[test]
    fn test_ttl_rejects_zero() {
        let err = Ttl::from_secs(0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTtl { seconds: 0, .. }));
    }

    #[test]
    fn test_ttl_conversions() {
        let ttl = Ttl::from_secs(90).unwrap();
        assert_eq!(ttl.as_secs(), 90);
        assert_eq!(ttl.as_duration(), Duration::from_secs(90));
        assert_eq!(ttl.to_string(), "90s");
    }

    #[test]
    fn test_ttl_serde() {
        let ttl: Ttl = serde_json::from_str("300").unwrap();
        assert_eq!(ttl.as_secs(), 300);
        assert_eq!(serde_json::to_string(&ttl).unwrap(), "300");
        assert!(serde_json::from_str::<Ttl>("0").is_err());
    }
}
