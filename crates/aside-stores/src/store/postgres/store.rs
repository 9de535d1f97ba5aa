//! Postgres persistent store backed by an sqlx pool.

use aside_core::{Key, Record};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, info};

use super::DatabaseConfig;
use crate::error::StoreError;
use crate::store::PersistentStore;

/// Reads records from a Postgres table.
///
/// Each lookup runs [`DatabaseConfig::select_statement`] and turns the row
/// (as `to_jsonb`) into a [`Record`]. The pool is owned by the store; it is
/// closed by [`PersistentStore::close`] or when the store is dropped.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    select_sql: String,
    acquire_timeout_ms: u64,
}

impl PostgresStore {
    /// Connects a pool using `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(config.host())
            .port(config.port())
            .username(config.user())
            .password(config.password())
            .database(config.dbname());

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections())
            .acquire_timeout(config.acquire_timeout())
            .connect_with(options)
            .await
            .map_err(|e| StoreError::connection(format!("failed to connect to Postgres: {}", e)))?;

        info!(
            host = %config.host(),
            port = config.port(),
            dbname = %config.dbname(),
            table = %config.table(),
            "Postgres store connected"
        );

        Ok(Self::from_pool(pool, config))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            select_sql: config.select_statement(),
            acquire_timeout_ms: config.acquire_timeout().as_millis() as u64,
        }
    }

    /// Checks that the database answers a trivial query.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| self.map_error("<health>", e))
    }

    fn map_error(&self, key: &str, e: sqlx::Error) -> StoreError {
        match e {
            sqlx::Error::PoolTimedOut => StoreError::Timeout {
                millis: self.acquire_timeout_ms,
            },
            sqlx::Error::PoolClosed => StoreError::Closed,
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StoreError::connection(e.to_string()),
            other => StoreError::query(key, other.to_string()),
        }
    }
}

#[async_trait]
impl PersistentStore for PostgresStore {
    async fn get(&self, key: &Key) -> Result<Option<Record>, StoreError> {
        let row: Option<serde_json::Value> = sqlx::query_scalar(&self.select_sql)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.map_error(key.as_str(), e))?;

        debug!(key = %key, found = row.is_some(), "Postgres store lookup");

        row.map(|value| {
            Record::from_value(value).map_err(|e| StoreError::decode(key.as_str(), e.to_string()))
        })
        .transpose()
    }

    fn name(&self) -> &str {
        "postgres"
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        info!("Postgres store closed");
        Ok(())
    }
}
