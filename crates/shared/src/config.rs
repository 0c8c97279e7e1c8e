//! Application configuration management.

use serde::Deserialize;

use crate::types::{ConcurrencyStrategy, Isolation};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Transfer defaults.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a new connection or a pooled one.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Log every SQL statement at debug level.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

impl DatabaseConfig {
    /// Builds a configuration for `url` with every other field defaulted.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Transfer defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// Strategy used when the operator does not pick one.
    #[serde(default)]
    pub default_strategy: ConcurrencyStrategy,
    /// Isolation for the pessimistic unit of work.
    #[serde(default = "default_pessimistic_isolation")]
    pub pessimistic_isolation: Isolation,
    /// Isolation for the optimistic compare-and-swap unit of work.
    #[serde(default = "default_optimistic_isolation")]
    pub optimistic_isolation: Isolation,
}

fn default_pessimistic_isolation() -> Isolation {
    Isolation::Serializable
}

fn default_optimistic_isolation() -> Isolation {
    Isolation::ReadCommitted
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            default_strategy: ConcurrencyStrategy::default(),
            pessimistic_isolation: default_pessimistic_isolation(),
            optimistic_isolation: default_optimistic_isolation(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_database_url(None)
    }

    /// Like [`AppConfig::load`], with `database_url` taking precedence over
    /// every other source when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a required value is
    /// still missing.
    pub fn load_with_database_url(
        database_url: Option<&str>,
    ) -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERLOCK").separator("__"))
            .set_override_option("database.url", database_url)?
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LEDGERLOCK__DATABASE__URL", Some("sqlite::memory:")),
                ("LEDGERLOCK__DATABASE__MAX_CONNECTIONS", Some("3")),
                ("LEDGERLOCK__TRANSFER__DEFAULT_STRATEGY", Some("optimistic")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 3);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(
                    config.transfer.default_strategy,
                    ConcurrencyStrategy::Optimistic
                );
                assert_eq!(config.transfer.pessimistic_isolation, Isolation::Serializable);
                assert_eq!(config.transfer.optimistic_isolation, Isolation::ReadCommitted);
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [
                ("LEDGERLOCK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_database_url_override_fills_missing_url() {
        temp_env::with_vars(
            [
                ("LEDGERLOCK__DATABASE__URL", Some("postgres://from-env/ledger")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load_with_database_url(Some("sqlite::memory:")).unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
            },
        );
        temp_env::with_vars(
            [
                ("LEDGERLOCK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load_with_database_url(Some("sqlite::memory:")).unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
            },
        );
    }

    #[test]
    fn test_database_url_override_keeps_parse_errors() {
        temp_env::with_vars(
            [
                ("LEDGERLOCK__DATABASE__MAX_CONNECTIONS", Some("lots")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load_with_database_url(Some("sqlite::memory:")).is_err());
            },
        );
    }

    #[test]
    fn test_database_config_with_url() {
        let config = DatabaseConfig::with_url("postgres://localhost/ledger");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.connect_timeout_secs, 8);
        assert!(!config.sqlx_logging);
    }
}
