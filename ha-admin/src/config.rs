//! Configuration parsing and management

use crate::error::{AdminError, Result};
use ha_common::{DEFAULT_BROKER, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "HA_ADMIN_CONFIG";

/// Main configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection defaults
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for the connection options every command accepts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Broker address used when `--broker` is not given
    #[serde(default = "default_broker")]
    pub broker: String,
    /// Connect and request timeout in seconds, 0 disables it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// SASL mechanism requested when opening a session
    #[serde(default)]
    pub sasl_mechanism: Option<String>,
}

fn default_broker() -> String {
    DEFAULT_BROKER.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            broker: default_broker(),
            timeout_secs: default_timeout(),
            sasl_mechanism: None,
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AdminError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| AdminError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the file named by `HA_ADMIN_CONFIG`, or the defaults when it is unset
    pub fn discover() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }
}
