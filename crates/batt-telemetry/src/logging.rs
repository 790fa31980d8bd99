//! Structured logging.
//!
//! The batt crates emit `tracing` events and never install a subscriber
//! themselves. [`init_logging`] installs one for the whole process: JSON lines
//! for production, pretty or compact text for development.
//!
//! # Example
//!
//! ```rust,no_run
//! use batt_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).unwrap();
//! tracing::info!(task_name = "reindex", "task submitted");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directives, e.g. `info` or `batt_tasks=debug,info`.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Whether to emit span open/close events.
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include the target (module path).
    pub include_target: bool,

    /// Whether to use ANSI colors in text formats.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            span_events: false,
            file_line_info: false,
            include_target: true,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Human-readable output at debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            span_events: true,
            file_line_info: true,
            ansi: true,
            ..Self::default()
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Builds the filter for this configuration.
    pub fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        create_env_filter(&self.level)
    }
}

/// Installs the global subscriber.
///
/// Does nothing when `config.enabled` is false. Fails if the filter is
/// invalid or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = config.env_filter()?;
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target)
        .with_ansi(config.ansi);

    let layer = match config.format {
        LogFormat::Json => layer.json().with_filter(filter).boxed(),
        LogFormat::Pretty => layer.pretty().with_filter(filter).boxed(),
        LogFormat::Compact => layer.compact().with_filter(filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses filter directives.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: filter.to_string(),
        reason: e.to_string(),
    })
}

/// Field names used across batt log events.
pub mod fields {
    /// Request ID.
    pub const REQUEST_ID: &str = "request_id";

    /// Task ID.
    pub const TASK_ID: &str = "task_id";

    /// Task name.
    pub const TASK_NAME: &str = "task_name";

    /// Error.
    pub const ERROR: &str = "error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
        assert_eq!(LogConfig::production(), config);
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.span_events);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("batt_tasks=debug,warn").is_ok());
        assert!(matches!(
            create_env_filter("batt_tasks=notalevel"),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            level: "not a filter [".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig {
            format: LogFormat::Compact,
            ..LogConfig::default()
        };
        // The first call may lose to another test; the second always fails.
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::LoggingInit(_))
        ));
    }
}
