//! Layered configuration loading.
//!
//! Layers apply in order, later ones winning: defaults or a preset, then a
//! TOML or JSON file, then `PREFIX__SECTION__KEY` environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{BattConfig, ConfigError};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "BATT";

/// Builds a [`BattConfig`] from defaults, files and the environment.
///
/// # Example
///
/// ```no_run
/// use batt_config::ConfigLoader;
///
/// # fn main() -> Result<(), batt_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_dotenv()?
///     .with_optional_file("batt.toml")?
///     .with_env_prefix("BATT")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: BattConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BattConfig::default(),
            env_prefix: None,
            file_loaded: false,
        }
    }

    /// Start from [`BattConfig::development`].
    ///
    /// ```
    /// use batt_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = BattConfig::development();
        self
    }

    /// Start from [`BattConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = BattConfig::production();
        self
    }

    /// Load a `.toml` or `.json` file, replacing the current layer.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed, has an unknown
    /// extension or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.config = parse(&content, format)?;
        self.file_loaded = true;

        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// ```
    /// use batt_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[tasks]\nmax_workers = 4\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.tasks.max_workers, 4);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Read overrides from `PREFIX__SECTION__KEY` variables when loading.
    ///
    /// With prefix `BATT`, `BATT__TASKS__MAX_WORKERS=4` sets
    /// `tasks.max_workers`. Unrecognized keys under the prefix are ignored.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load `.env` from the current directory or its parents, if there is one.
    ///
    /// # Errors
    ///
    /// Fails if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::EnvFile(e.to_string())),
        }
    }

    /// Load a specific env file into the process environment.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref()).map_err(|e| ConfigError::EnvFile(e.to_string()))?;
        Ok(self)
    }

    /// Whether a file layer was loaded.
    pub const fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Apply environment overrides and validate.
    pub fn load(self) -> Result<BattConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides without validating.
    pub fn load_unvalidated(mut self) -> Result<BattConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix, env::vars())?;
        }
        Ok(self.config)
    }

    fn apply_env_overrides(
        &mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        let scoped = format!("{prefix}__");
        for (key, value) in vars {
            if let Some(rest) = key.strip_prefix(&scoped) {
                let parts: Vec<&str> = rest.split("__").collect();
                self.apply_env_var(&key, &parts, &value)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, parts: &[&str], value: &str) -> Result<(), ConfigError> {
        let config = &mut self.config;
        match parts {
            ["BINDING", "VALIDATE"] => config.binding.validate = bool_var(key, value)?,
            ["BINDING", "MAX_BODY_SIZE"] => config.binding.max_body_size = int_var(key, value)?,

            ["TASKS", "MAX_WORKERS"] => config.tasks.max_workers = int_var(key, value)?,
            ["TASKS", "QUEUE_CAPACITY"] => config.tasks.queue_capacity = int_var(key, value)?,
            ["TASKS", "MAX_ATTEMPTS"] => config.tasks.max_attempts = int_var(key, value)?,
            ["TASKS", "RETRY_DELAY_MS"] => config.tasks.retry_delay_ms = int_var(key, value)?,

            ["CACHE", "ADDRESSES"] => {
                config.cache.addresses = value
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect();
            }
            ["CACHE", "USERNAME"] => config.cache.username = Some(value.to_string()),
            ["CACHE", "PASSWORD"] => config.cache.password = Some(value.to_string()),

            ["LOGGING", "ENABLED"] => config.logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = value
                    .parse()
                    .map_err(|reason: String| ConfigError::env_parse_error(key, reason))?;
            }
            ["LOGGING", "ANSI_ENABLED"] => config.logging.ansi_enabled = bool_var(key, value)?,
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = bool_var(key, value)?;
            }

            _ => {}
        }
        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<BattConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn int_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
