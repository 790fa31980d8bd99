//! Root configuration.

use batt_cache::CacheConfig;
use batt_extract::BinderConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{LogFormat, LoggingConfig, TasksConfig};

/// Everything a batt service reads at startup.
///
/// Sections missing from a file keep their defaults. Unknown fields are
/// rejected.
///
/// ```toml
/// [binding]
/// validate = true
/// max_body_size = 1048576
///
/// [tasks]
/// max_workers = 8
/// max_attempts = 5
/// retry_delay_ms = 2000
///
/// [cache]
/// addresses = ["127.0.0.1:6379"]
///
/// [logging]
/// level = "info"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BattConfig {
    /// Request binding.
    pub binding: BinderConfig,

    /// Background tasks.
    pub tasks: TasksConfig,

    /// Cache backend. No addresses means in-process.
    pub cache: CacheConfig,

    /// Logging.
    pub logging: LoggingConfig,
}

impl BattConfig {
    /// Local development: pretty debug logs with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                include_location: true,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production: JSON logs at info.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_body_size",
                "must be greater than 0",
            ));
        }

        self.tasks.validate()?;

        if self.cache.addresses.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "cache.addresses",
                "addresses must not be empty",
            ));
        }
        if self.cache.password.is_some() && !self.cache.is_remote() {
            return Err(ConfigError::invalid_value(
                "cache.password",
                "credentials require at least one address",
            ));
        }

        self.logging.validate()
    }
}
