//! Configuration sections that have no serde form in their own crate.
//!
//! Binding and cache sections reuse [`BinderConfig`](batt_extract::BinderConfig)
//! and [`CacheConfig`](batt_cache::CacheConfig) directly. Tasks and logging are
//! described here and converted into the runtime types on demand.

use std::time::Duration;

use batt_tasks::{PoolConfig, RetryPolicy};
use batt_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Worker pool and default retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TasksConfig {
    /// Maximum number of tasks running at once.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Maximum number of tasks waiting for a worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Default number of attempts per task.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Default delay between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_workers() -> usize {
    PoolConfig::default().max_workers
}

fn default_queue_capacity() -> usize {
    PoolConfig::default().queue_capacity
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            queue_capacity: default_queue_capacity(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl TasksConfig {
    /// Pool settings for [`WorkerPool::new`](batt_tasks::WorkerPool::new).
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.max_workers).with_queue_capacity(self.queue_capacity)
    }

    /// The default retry policy.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
            .map_err(|e| ConfigError::invalid_value("tasks.max_attempts", e.to_string()))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.pool_config().validate().map_err(|e| {
            let field = if self.max_workers == 0 || u32::try_from(self.max_workers).is_err() {
                "tasks.max_workers"
            } else {
                "tasks.queue_capacity"
            };
            ConfigError::invalid_value(field, e.to_string())
        })?;
        self.retry_policy().map(|_| ())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Multi-line text.
    Pretty,
    /// Single-line text.
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "unknown log format '{other}', expected json, pretty or compact"
            )),
        }
    }
}

impl From<LogFormat> for batt_telemetry::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether to install a subscriber at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// ANSI colors in text formats.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// File and line of each event.
    #[serde(default)]
    pub include_location: bool,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Settings for [`init_logging`](batt_telemetry::init_logging).
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format.into(),
            file_line_info: self.include_location,
            ansi: self.ansi_enabled,
            ..LogConfig::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        batt_telemetry::create_env_filter(&self.level)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))
    }
}
