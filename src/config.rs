use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_DATABASE_URL: &str = "sqlite://mealdrop.db?mode=rwc";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_CURRENCY: &str = "USD";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "MEALDROP";

/// Application configuration with validation.
///
/// Layered from `config/default.toml`, an optional per-environment file, and
/// `MEALDROP_`-prefixed environment variables (highest precedence).
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum number of pooled connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    /// Application environment name
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level / EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Platform currency; every monetary value in the system uses it
    #[validate(length(min = 3, max = 3, message = "Currency must be 3 characters"))]
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_db_connect_timeout_secs() -> u64 {
    30
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            currency: default_currency(),
        }
    }
}

impl AppConfig {
    /// Convenience constructor for programmatic setup (tests, embedding).
    pub fn new(database_url: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            environment: environment.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from files and the process environment.
    pub fn load() -> Result<AppConfig, ConfigError> {
        let environment =
            std::env::var(format!("{ENV_PREFIX}_ENVIRONMENT")).unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let config = Config::builder()
            .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
            .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid configuration: {e}")))?;

        info!(environment = %app_config.environment, "Configuration loaded");
        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.currency, "USD");
        assert_eq!(config.environment, "development");
        assert!(!config.auto_migrate);
    }

    #[test]
    fn bad_currency_fails_validation() {
        let config = AppConfig {
            currency: "DOLLARS".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn programmatic_constructor_overrides_url() {
        let config = AppConfig::new("sqlite::memory:", "test");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.environment, "test");
        assert_eq!(config.db_max_connections, 10);
    }
}
