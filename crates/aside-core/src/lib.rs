//! Aside Core - Domain types
//!
//! This crate provides the foundational types shared by the cache-aside
//! service and its store adapters: the [`Record`] value, the validated
//! [`Key`] and [`Ttl`] newtypes, and the [`CoreError`] validation error.

pub mod error;
pub mod record;
pub mod types;

pub use error::{CoreError, Result};
pub use record::Record;
pub use types::{Key, Ttl};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
