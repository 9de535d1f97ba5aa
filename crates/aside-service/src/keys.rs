//! Cache key derivation.

use std::fmt;

use aside_core::Key;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "aside";

/// Backend-facing key of a cache entry.
///
/// Derived from the record key by prefixing a namespace:
/// `"{namespace}:{key}"`. Derivation is a pure function of its inputs, so
/// every instance configured with the same namespace agrees on where a
/// record lives in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the cache key of `key` under `namespace`.
    ///
    /// # Examples
    ///
    /// ```
    /// use aside_core::Key;
    /// use aside_service::keys::CacheKey;
    ///
    /// let key = Key::new("u:7").unwrap();
    /// let cache_key = CacheKey::derive("aside", &key);
    /// assert_eq!(cache_key.as_str(), "aside:u:7");
    /// ```
    pub fn derive(namespace: &str, key: &Key) -> Self {
        Self(format!("{}:{}", namespace, key.as_str()))
    }

    /// Returns the key as sent to the cache backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Checks that a namespace can be used as a cache key prefix.
///
/// The namespace must be non-empty and free of whitespace and control
/// characters, which some backends (memcached) reject in keys.
pub fn validate_namespace(namespace: &str) -> Result<(), String> {
    if namespace.is_empty() {
        return Err("namespace cannot be empty".to_string());
    }
    if namespace
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(format!(
            "namespace '{}' contains whitespace or control characters",
            namespace
        ));
    }
    Ok(())
}
