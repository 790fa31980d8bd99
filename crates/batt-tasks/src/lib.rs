//! # Batt Tasks
//!
//! Background work with bounded concurrency and bounded retries.
//!
//! - [`WorkerPool`] - runs at most `max_workers` jobs at once from a bounded
//!   queue; [`WorkerPool::shutdown`] stops it and waits for queued and
//!   running jobs
//! - [`Retrier`] - submits a fallible operation, retries it with a fixed
//!   delay and reports the last error through an [`ErrorHook`]
//!
//! ```rust,no_run
//! use batt_tasks::{PoolConfig, Retrier, RetryPolicy, WorkerPool};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = WorkerPool::new(PoolConfig::new(8)).unwrap();
//!     let retrier = Retrier::new(pool.clone()).with_hook(|failure| {
//!         eprintln!("giving up: {failure}");
//!     });
//!
//!     // Fire and forget: the handle is dropped.
//!     retrier
//!         .process(
//!             "send-email",
//!             || async { Ok::<_, std::io::Error>(()) },
//!             RetryPolicy::new(5, Duration::from_secs(2)).unwrap(),
//!         )
//!         .await
//!         .unwrap();
//!
//!     pool.shutdown().await;
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/batt-tasks/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod pool;
mod retry;
mod task;

pub use error::{TaskError, TaskResult};
pub use pool::{PoolConfig, WorkerPool};
pub use retry::{log_failure, ErrorHook, Retrier, RetryPolicy};
pub use task::{TaskFailure, TaskHandle, TaskId, TaskOutcome, TaskStats};
