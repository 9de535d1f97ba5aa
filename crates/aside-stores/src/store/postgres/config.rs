//! Postgres store configuration.

use std::time::Duration;

use serde::Deserialize;

/// Error returned when a [`DatabaseConfig`] fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid database configuration: {field}: {reason}")]
pub struct DatabaseConfigError {
    /// The offending field.
    pub field: &'static str,
    /// Why it was rejected.
    pub reason: String,
}

impl DatabaseConfigError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Configuration for the Postgres persistent store.
///
/// Records are read from `table`, matching `key_column` against the
/// requested key, and returned as the JSON object of the whole row.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database name.
    dbname: String,

    /// Database user.
    user: String,

    /// Database password.
    password: String,

    /// Server host.
    #[serde(default = "default_host")]
    host: String,

    /// Server port.
    #[serde(default = "default_port")]
    port: u16,

    /// Table holding the records.
    #[serde(default = "default_table")]
    table: String,

    /// Column matched against the record key.
    #[serde(default = "default_key_column")]
    key_column: String,

    /// SQL type of the key column; the bound key is cast to it.
    #[serde(default = "default_key_type")]
    key_type: String,

    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    max_connections: u32,

    /// Time allowed to acquire a pooled connection, in seconds.
    #[serde(default = "default_acquire_timeout_secs")]
    acquire_timeout_secs: u64,
}

fn default_host() -> String {
    "postgres_db".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_table() -> String {
    "records".to_string()
}

fn default_key_column() -> String {
    "id".to_string()
}

fn default_key_type() -> String {
    "text".to_string()
}

/// Key column types a text key can be cast to.
const KEY_TYPES: &[&str] = &[
    "text", "varchar", "smallint", "integer", "int", "int2", "int4", "bigint", "int8", "uuid",
];

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl DatabaseConfig {
    /// Creates a new builder for DatabaseConfig.
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::default()
    }

    /// Validates the configuration, trimming the text fields.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first field that is empty, whitespace
    /// only, out of range, or not a plain SQL identifier.
    pub fn validate(mut self) -> Result<Self, DatabaseConfigError> {
        self.dbname = non_empty("dbname", self.dbname)?;
        self.user = non_empty("user", self.user)?;
        self.password = non_empty("password", self.password)?;
        self.host = non_empty("host", self.host)?;

        if self.port == 0 {
            return Err(DatabaseConfigError::new("port", "must be between 1 and 65535"));
        }

        self.table = identifier("table", self.table)?;
        self.key_column = identifier("key_column", self.key_column)?;
        self.key_type = key_type(self.key_type)?;

        if self.max_connections == 0 {
            return Err(DatabaseConfigError::new(
                "max_connections",
                "must be at least 1",
            ));
        }

        Ok(self)
    }

    /// Returns the database name.
    pub fn dbname(&self) -> &str {
        &self.dbname
    }

    /// Returns the database user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the database password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the server host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the server port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the records table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the key column.
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Returns the SQL type of the key column.
    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// Returns the maximum pool size.
    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    /// Returns the connection acquire timeout.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Returns the lookup statement for the configured table and column.
    ///
    /// The bound key is cast to the column type, leaving the column itself
    /// untouched so an index on it stays usable.
    pub fn select_statement(&self) -> String {
        format!(
            "SELECT to_jsonb(t) FROM \"{}\" t WHERE t.\"{}\" = $1::{} LIMIT 1",
            self.table, self.key_column, self.key_type
        )
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("table", &self.table)
            .field("key_column", &self.key_column)
            .field("key_type", &self.key_type)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, DatabaseConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DatabaseConfigError::new(
            field,
            "value cannot be empty or whitespace only",
        ));
    }
    Ok(trimmed.to_string())
}

fn identifier(field: &'static str, value: String) -> Result<String, DatabaseConfigError> {
    let value = non_empty(field, value)?;
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !(valid_start && valid_rest) {
        return Err(DatabaseConfigError::new(
            field,
            format!("'{}' is not a valid SQL identifier", value),
        ));
    }
    Ok(value)
}

fn key_type(value: String) -> Result<String, DatabaseConfigError> {
    let value = non_empty("key_type", value)?.to_lowercase();
    if !KEY_TYPES.contains(&value.as_str()) {
        return Err(DatabaseConfigError::new(
            "key_type",
            format!("'{}' is not one of {}", value, KEY_TYPES.join(", ")),
        ));
    }
    Ok(value)
}

/// Builder for DatabaseConfig.
#[derive(Debug, Default)]
pub struct DatabaseConfigBuilder {
    dbname: Option<String>,
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    table: Option<String>,
    key_column: Option<String>,
    key_type: Option<String>,
    max_connections: Option<u32>,
    acquire_timeout: Option<Duration>,
}

impl DatabaseConfigBuilder {
    /// Sets the database name.
    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = Some(dbname.into());
        self
    }

    /// Sets the database user and password.
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the server host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the records table.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Sets the key column.
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    /// Sets the SQL type of the key column.
    pub fn key_type(mut self, key_type: impl Into<String>) -> Self {
        self.key_type = Some(key_type.into());
        self
    }

    /// Sets the maximum pool size.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Sets the connection acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or invalid.
    pub fn build(self) -> Result<DatabaseConfig, DatabaseConfigError> {
        DatabaseConfig {
            dbname: self.dbname.unwrap_or_default(),
            user: self.user.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            host: self.host.unwrap_or_else(default_host),
            port: self.port.unwrap_or_else(default_port),
            table: self.table.unwrap_or_else(default_table),
            key_column: self.key_column.unwrap_or_else(default_key_column),
            key_type: self.key_type.unwrap_or_else(default_key_type),
            max_connections: self.max_connections.unwrap_or_else(default_max_connections),
            acquire_timeout_secs: self
                .acquire_timeout
                .map(|t| t.as_secs())
                .unwrap_or_else(default_acquire_timeout_secs),
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DatabaseConfigBuilder {
        DatabaseConfig::builder().dbname("db").credentials("u", "p")
    }

    #[test]
    fn test_defaults() {
        let config = valid().build().unwrap();

        assert_eq!(config.host(), "postgres_db");
        assert_eq!(config.port(), 5432);
        assert_eq!(config.table(), "records");
        assert_eq!(config.key_column(), "id");
        assert_eq!(config.key_type(), "text");
        assert_eq!(config.max_connections(), 5);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_required_fields_name_the_field() {
        let cases = [
            (DatabaseConfig::builder().dbname("").credentials("u", "p"), "dbname"),
            (DatabaseConfig::builder().dbname("db").credentials(" ", "p"), "user"),
            (DatabaseConfig::builder().dbname("db").credentials("u", ""), "password"),
            (DatabaseConfig::builder().credentials("u", "p"), "dbname"),
        ];

        for (builder, field) in cases {
            let err = builder.build().unwrap_err();
            assert_eq!(err.field, field);
            assert!(err.to_string().contains(field));
        }
    }

    #[test]
    fn test_values_are_trimmed() {
        let config = DatabaseConfig::builder()
            .dbname("  db ")
            .credentials(" u", "p ")
            .host(" pg.internal ")
            .build()
            .unwrap();

        assert_eq!(config.dbname(), "db");
        assert_eq!(config.user(), "u");
        assert_eq!(config.password(), "p");
        assert_eq!(config.host(), "pg.internal");
    }

    #[test]
    fn test_port_zero_rejected() {
        let err = valid().port(0).build().unwrap_err();
        assert_eq!(err.field, "port");
    }

    #[test]
    fn test_identifiers_validated() {
        assert!(valid().table("user_profiles").build().is_ok());

        let err = valid().table("users; DROP TABLE x").build().unwrap_err();
        assert_eq!(err.field, "table");

        let err = valid().key_column("1id").build().unwrap_err();
        assert_eq!(err.field, "key_column");
    }

    #[test]
    fn test_select_statement() {
        let config = valid().table("users").key_column("user_id").build().unwrap();
        assert_eq!(
            config.select_statement(),
            "SELECT to_jsonb(t) FROM \"users\" t WHERE t.\"user_id\" = $1::text LIMIT 1"
        );
    }

    #[test]
    fn test_select_statement_casts_key_not_column() {
        let config = valid().key_type(" BIGINT ").build().unwrap();

        assert_eq!(config.key_type(), "bigint");
        assert_eq!(
            config.select_statement(),
            "SELECT to_jsonb(t) FROM \"records\" t WHERE t.\"id\" = $1::bigint LIMIT 1"
        );
        assert!(!config.select_statement().contains("\"id\"::"));
    }

    #[test]
    fn test_unknown_key_type_rejected() {
        let err = valid().key_type("text; DROP TABLE x").build().unwrap_err();
        assert_eq!(err.field, "key_type");

        let err = valid().key_type("").build().unwrap_err();
        assert_eq!(err.field, "key_type");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig::builder()
            .dbname("db")
            .credentials("u", "hunter2")
            .build()
            .unwrap();

        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_deserialize_then_validate() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"dbname": "db", "user": "u", "password": "p", "port": 6543}"#)
                .unwrap();
        let config = config.validate().unwrap();

        assert_eq!(config.port(), 6543);
        assert_eq!(config.host(), "postgres_db");
    }
}
