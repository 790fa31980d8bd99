//! # Batt Telemetry
//!
//! Logging setup for services built on batt.
//!
//! - [`LogConfig`] / [`LogFormat`] - what to log and how
//! - [`init_logging`] - installs a global `tracing` subscriber with an
//!   env-filter and JSON, pretty or compact output

#![doc(html_root_url = "https://docs.rs/batt-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
