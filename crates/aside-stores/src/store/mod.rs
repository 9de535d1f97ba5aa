//! Persistent store capability and its adapters.

mod memory;
mod postgres;
mod traits;

pub use memory::MemoryStore;
pub use postgres::{DatabaseConfig, DatabaseConfigBuilder, DatabaseConfigError};
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use traits::PersistentStore;
