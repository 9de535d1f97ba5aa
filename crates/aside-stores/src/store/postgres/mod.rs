//! Postgres persistent store.

mod config;
#[cfg(feature = "postgres")]
mod store;

pub use config::{DatabaseConfig, DatabaseConfigBuilder, DatabaseConfigError};
#[cfg(feature = "postgres")]
pub use store::PostgresStore;
