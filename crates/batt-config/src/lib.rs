//! # Batt Config
//!
//! Typed, layered configuration for batt services.
//!
//! [`ConfigLoader`] starts from defaults (or a preset), applies a TOML or JSON
//! file, then `BATT__SECTION__KEY` environment overrides, and validates the
//! result. The sections convert into the runtime types of the other crates:
//!
//! ```
//! use batt_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_string(
//!         r#"
//!         [tasks]
//!         max_workers = 4
//!         max_attempts = 5
//!
//!         [logging]
//!         format = "compact"
//!         "#,
//!         "toml",
//!     )
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! let pool = config.tasks.pool_config();
//! let policy = config.tasks.retry_policy().unwrap();
//! let logging = config.logging.log_config();
//!
//! assert_eq!(pool.max_workers, 4);
//! assert_eq!(policy.max_attempts(), 5);
//! assert_eq!(logging.format, batt_telemetry::LogFormat::Compact);
//! ```

#![doc(html_root_url = "https://docs.rs/batt-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::BattConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LogFormat, LoggingConfig, TasksConfig};
