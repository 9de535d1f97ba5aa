//! Runtime settings.
//!
//! Settings are layered with the `config` crate: an optional `aside.toml`
//! in the working directory, an explicit file passed on the command line,
//! then `ASIDE__SECTION__FIELD` environment variables. The merged tree is
//! deserialized into raw, all-optional settings and validated into
//! [`Settings`].
//!
//! ```toml
//! [service]
//! default_ttl = 3600
//! namespace = "aside"
//!
//! [cache]
//! type = "redis"
//!
//! [cache.redis]
//! host = "cache"
//! port = 6379
//!
//! [store]
//! type = "postgres"
//!
//! [store.postgres]
//! dbname = "app"
//! user = "app"
//! password = "secret"
//! ```

use std::path::{Path, PathBuf};

use aside_core::Ttl;
use aside_stores::{
    CacheBackend, CacheKind, DatabaseConfig, MemcachedConfig, MemoryCacheConfig, RedisConfig,
    StoreBackend, StoreKind,
};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::keys::{DEFAULT_NAMESPACE, validate_namespace};

const DEFAULT_CONFIG_BASENAME: &str = "aside";
const DEFAULT_TTL_SECS: u64 = 3600;

/// Validated settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub service: ServiceSettings,
    pub cache: CacheBackend,
    pub store: StoreBackend,
    pub logging: LoggingSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub default_ttl: Ttl,
    pub namespace: String,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsSettings {
    /// Installs a Prometheus recorder and prints it on exit.
    pub enabled: bool,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Loads settings from the default file, `config_file` and the environment.
pub fn load(config_file: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("ASIDE").separator("__"));

    from_builder(builder)
}

/// Builds and validates settings from an already layered builder.
pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Settings, SettingsError> {
    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::from_raw(raw)
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            service: raw.service.validate()?,
            cache: raw.cache.validate()?,
            store: raw.store.validate()?,
            logging: raw.logging.validate()?,
            metrics: MetricsSettings {
                enabled: raw.metrics.enabled.unwrap_or(false),
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    service: RawServiceSettings,
    cache: RawCacheSettings,
    store: RawStoreSettings,
    logging: RawLoggingSettings,
    metrics: RawMetricsSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServiceSettings {
    default_ttl: Option<u64>,
    namespace: Option<String>,
}

impl RawServiceSettings {
    fn validate(self) -> Result<ServiceSettings, SettingsError> {
        let seconds = self.default_ttl.unwrap_or(DEFAULT_TTL_SECS);
        let default_ttl = Ttl::from_secs(seconds)
            .map_err(|_| SettingsError::invalid("service.default_ttl", "must be greater than zero"))?;

        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        validate_namespace(&namespace)
            .map_err(|reason| SettingsError::invalid("service.namespace", reason))?;

        Ok(ServiceSettings {
            default_ttl,
            namespace,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    #[serde(rename = "type")]
    kind: Option<String>,
    memory: MemoryCacheConfig,
    redis: RedisConfig,
    memcached: MemcachedConfig,
}

impl RawCacheSettings {
    fn validate(self) -> Result<CacheBackend, SettingsError> {
        let kind = match self.kind.as_deref() {
            Some(kind) => kind
                .parse::<CacheKind>()
                .map_err(|e| SettingsError::invalid("cache.type", e.to_string()))?,
            None => CacheKind::Memory,
        };

        Ok(match kind {
            CacheKind::Memory => {
                if self.memory.max_capacity == 0 {
                    return Err(SettingsError::invalid(
                        "cache.memory.max_capacity",
                        "must be greater than zero",
                    ));
                }
                CacheBackend::Memory(self.memory)
            },
            CacheKind::Noop => CacheBackend::Noop,
            CacheKind::Redis => {
                if self.redis.host.trim().is_empty() {
                    return Err(SettingsError::invalid("cache.redis.host", "cannot be empty"));
                }
                CacheBackend::Redis(self.redis)
            },
            CacheKind::Memcached => {
                if self.memcached.servers.is_empty() {
                    return Err(SettingsError::invalid(
                        "cache.memcached.servers",
                        "at least one server is required",
                    ));
                }
                CacheBackend::Memcached(self.memcached)
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    #[serde(rename = "type")]
    kind: Option<String>,
    memory: RawMemoryStoreSettings,
    postgres: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMemoryStoreSettings {
    seed: Option<PathBuf>,
}

impl RawStoreSettings {
    fn validate(self) -> Result<StoreBackend, SettingsError> {
        let kind = match self.kind.as_deref() {
            Some(kind) => kind
                .parse::<StoreKind>()
                .map_err(|e| SettingsError::invalid("store.type", e.to_string()))?,
            None => StoreKind::Memory,
        };

        match kind {
            StoreKind::Memory => Ok(StoreBackend::Memory {
                seed: self.memory.seed,
            }),
            StoreKind::Postgres => {
                let config = self.postgres.ok_or_else(|| {
                    SettingsError::invalid("store.postgres", "section is required for postgres")
                })?;
                let config = config
                    .validate()
                    .map_err(|e| SettingsError::invalid("store.postgres", e.to_string()))?;
                Ok(StoreBackend::Postgres(config))
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl RawLoggingSettings {
    fn validate(self) -> Result<LoggingSettings, SettingsError> {
        let level = match self.level {
            Some(level) => level
                .parse::<LevelFilter>()
                .map_err(|_| SettingsError::invalid("logging.level", format!("unknown level '{}'", level)))?,
            None => LevelFilter::INFO,
        };

        Ok(LoggingSettings {
            level,
            json: self.json.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMetricsSettings {
    enabled: Option<bool>,
}
