//! Configuration management
//!
//! Environment-and-file based configuration with defaults and validation.
//! TOML files supply the base; `ROOMLINK_*` environment variables override
//! individual values.

use crate::core_channel::ConnectOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pairing configuration
    pub pairing: PairingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Pairing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Interval between automatic join code rotations ("5m", "30s", ...);
    /// absent disables the rotation loop
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Option<Duration>,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Some(Duration::from_secs(300)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Emit JSON formatted logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply env overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let mut config: Config =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from defaults plus env overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(interval) = self.pairing.refresh_interval {
            if interval < Duration::from_secs(1) {
                return Err(ConfigError::InvalidValue(format!(
                    "pairing.refresh_interval must be at least 1s, got {:?}",
                    interval
                )));
            }
        }
        if crate::logging::LogLevel::from_str(&self.logging.level).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Connection options derived from this configuration
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            join_code_refresh: self.pairing.refresh_interval,
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(level) = env::var("ROOMLINK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = env::var("ROOMLINK_LOG_JSON") {
            self.logging.json_format = json == "1" || json.eq_ignore_ascii_case("true");
        }
        if let Ok(secs) = env::var("ROOMLINK_JOIN_CODE_REFRESH_SECS") {
            if secs.is_empty() || secs == "0" {
                self.pairing.refresh_interval = None;
            } else {
                let secs: u64 = secs.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "ROOMLINK_JOIN_CODE_REFRESH_SECS must be an integer, got '{}'",
                        secs
                    ))
                })?;
                self.pairing.refresh_interval = Some(Duration::from_secs(secs));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.pairing.refresh_interval,
            Some(Duration::from_secs(300))
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let config: Config = toml::from_str(
            r#"
            [pairing]
            refresh_interval = "30s"

            [logging]
            level = "debug"
            json_format = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.pairing.refresh_interval,
            Some(Duration::from_secs(30))
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json_format);
        assert_eq!(
            config.pairing.refresh_interval,
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    fn test_validation_rejects_subsecond_interval() {
        let config = Config {
            pairing: PairingConfig {
                refresh_interval: Some(Duration::from_millis(100)),
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_validation_rejects_unknown_level() {
        let config = Config {
            logging: LoggingConfig {
                level: "loud".to_string(),
                json_format: false,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_connect_options_carry_refresh_interval() {
        let config = Config::default();
        let options = config.connect_options();
        assert_eq!(options.join_code_refresh, config.pairing.refresh_interval);
    }
}
