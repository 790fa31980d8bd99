//! Task identity, outcomes and statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a new unique task ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TaskId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A task that used up every attempt.
#[derive(Debug)]
pub struct TaskFailure {
    /// Task ID.
    pub id: TaskId,
    /// Task name given at submission.
    pub name: String,
    /// Number of attempts made.
    pub attempts: u32,
    /// The error of the last attempt.
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} ({}) failed after {} attempt(s): {}",
            self.name, self.id, self.attempts, self.error
        )
    }
}

/// How a task ended.
#[derive(Debug)]
pub enum TaskOutcome {
    /// An attempt succeeded.
    Succeeded {
        /// The attempt that succeeded, starting at 1.
        attempts: u32,
    },
    /// Every attempt failed.
    Failed(TaskFailure),
}

impl TaskOutcome {
    /// Returns true if an attempt succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns the number of attempts made.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts } => *attempts,
            Self::Failed(failure) => failure.attempts,
        }
    }

    /// Returns the failure, if every attempt failed.
    pub const fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

/// Handle to a submitted task.
///
/// Awaiting it is optional: dropping the handle leaves the task running.
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    name: String,
    outcome: oneshot::Receiver<TaskOutcome>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, name: String, outcome: oneshot::Receiver<TaskOutcome>) -> Self {
        Self { id, name, outcome }
    }

    /// Get the task ID.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Get the task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the task to finish.
    ///
    /// Returns [`TaskError::Dropped`] if the task ended without reporting,
    /// which happens when the operation panics.
    pub async fn join(self) -> TaskResult<TaskOutcome> {
        self.outcome
            .await
            .map_err(|_| TaskError::dropped(self.name))
    }
}

/// Counters shared by a pool and its retriers.
#[derive(Debug, Default)]
pub struct TaskStats {
    submitted: AtomicU64,
    completed: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
}

impl TaskStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Jobs accepted by the pool.
    pub fn total_submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Jobs that ran to the end.
    pub fn total_completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Retried tasks that eventually succeeded.
    pub fn total_succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    /// Retried tasks that used up every attempt.
    pub fn total_failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Attempts beyond the first.
    pub fn total_retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}
