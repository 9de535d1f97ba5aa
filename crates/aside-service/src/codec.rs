//! Cache entry encoding.
//!
//! Records are cached as compact JSON. The format is private to the
//! service: the only promise is that `decode(encode(r)) == r`.

use aside_core::Record;

/// A cache payload that could not be encoded or decoded.
#[derive(Debug, thiserror::Error)]
#[error("invalid cache payload: {0}")]
pub struct CodecError(#[from] serde_json::Error);

/// Serializes a record for storage in the cache.
pub fn encode(record: &Record) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(record)?)
}

/// Deserializes a cached payload back into a record.
///
/// Anything other than a JSON object (including invalid UTF-8 and
/// truncated payloads) is rejected.
pub fn decode(bytes: &[u8]) -> Result<Record, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}
