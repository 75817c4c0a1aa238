//! Application configuration.
//!
//! Aggregates every section into a single Config struct loaded from YAML
//! files and `TINSEL__SECTION__KEY` environment variables.

mod email;
mod messaging;
mod server;
mod session;
mod storage;

pub use email::EmailConfig;
pub use messaging::MessagingConfig;
pub use server::{SearchConfig, ServerConfig};
pub use session::{SessionConfig, MIN_SECRET_LEN};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "TINSEL_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "TINSEL";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "TINSEL_LOG";
/// Environment variable selecting the log output format (`json` or text).
pub const LOG_FORMAT_ENV_VAR: &str = "TINSEL_LOG_FORMAT";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    #[error("Invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub email: EmailConfig,
    pub messaging: MessagingConfig,
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    ///
    /// The result is validated before it is returned.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config: Config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document without touching files or the environment.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, File, FileFormat};

        let config: Config = ConfigLib::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.secret.is_empty() {
            return Err(ConfigError::Missing("session.secret"));
        }
        if session.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "session.secret",
                reason: format!("must be at least {} bytes", MIN_SECRET_LEN),
            });
        }
        if session.officer_passcode.is_empty() {
            return Err(ConfigError::Missing("session.officer_passcode"));
        }
        if session.admin_passcode.is_empty() {
            return Err(ConfigError::Missing("session.admin_passcode"));
        }
        if session.ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "session.ttl_secs",
                reason: "must be positive".to_string(),
            });
        }

        if self.storage.path.trim().is_empty() {
            return Err(ConfigError::Missing("storage.path"));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "storage.max_connections",
                reason: "must be positive".to_string(),
            });
        }

        if self.messaging.bus_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "messaging.bus_capacity",
                reason: "must be positive".to_string(),
            });
        }
        if self.messaging.relay_batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "messaging.relay_batch_size",
                reason: "must be positive".to_string(),
            });
        }

        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid {
                key: "search.max_results",
                reason: "must be positive".to_string(),
            });
        }

        if self.email.enabled {
            if self.email.api_key.is_empty() {
                return Err(ConfigError::Missing("email.api_key"));
            }
            if self.email.queue_capacity == 0 {
                return Err(ConfigError::Invalid {
                    key: "email.queue_capacity",
                    reason: "must be positive".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Valid config for tests: in-memory storage, fixed secrets.
    pub fn for_test() -> Self {
        Self {
            storage: StorageConfig::in_memory(),
            session: SessionConfig {
                secret: "test-secret-test-secret-test-secret!".to_string(),
                officer_passcode: "officer-pass".to_string(),
                admin_passcode: "admin-pass".to_string(),
                ..SessionConfig::default()
            },
            ..Self::default()
        }
    }
}
