//! Error types for task submission.

use thiserror::Error;

/// Result type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors returned to the submitter.
///
/// Failures of the submitted operation itself never show up here; they go to
/// the retrier's error hook and the task's [`TaskOutcome`](crate::TaskOutcome).
#[derive(Debug, Error)]
pub enum TaskError {
    /// Invalid pool or retry configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pool has been shut down.
    #[error("worker pool is shut down")]
    PoolClosed,

    /// The queue is full and the submission was not allowed to wait.
    #[error("task queue full, capacity {0}")]
    QueueFull(usize),

    /// The task was dropped before reporting an outcome, e.g. it panicked.
    #[error("task {0} ended without an outcome")]
    Dropped(String),
}

impl TaskError {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Create a dropped-task error.
    pub fn dropped(name: impl Into<String>) -> Self {
        Self::Dropped(name.into())
    }

    /// Check if submitting again later may succeed.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::QueueFull(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_recoverable() {
        assert!(TaskError::QueueFull(8).is_recoverable());
        assert!(!TaskError::PoolClosed.is_recoverable());
        assert!(!TaskError::invalid_config("zero workers").is_recoverable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TaskError::invalid_config("max_attempts must be at least 1").to_string(),
            "invalid configuration: max_attempts must be at least 1"
        );
        assert!(TaskError::QueueFull(16).to_string().contains("16"));
    }
}
