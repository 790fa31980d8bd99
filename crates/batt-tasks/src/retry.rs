//! Retrying task submission.
//!
//! [`Retrier::process`] queues an operation on a [`WorkerPool`] and runs it
//! until it succeeds or the attempts run out, sleeping a fixed delay between
//! attempts. If every attempt fails the error hook is called once with the
//! last error. The submitter gets a [`TaskHandle`] it may await or drop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{TaskError, TaskResult};
use crate::pool::WorkerPool;
use crate::task::{TaskFailure, TaskHandle, TaskId, TaskOutcome};

/// Called once for every task that used up its attempts.
pub type ErrorHook = Arc<dyn Fn(&TaskFailure) + Send + Sync>;

/// The default hook: logs the failure at error level.
pub fn log_failure(failure: &TaskFailure) {
    tracing::error!(
        task_id = %failure.id,
        task_name = %failure.name,
        attempts = failure.attempts,
        error = %failure.error,
        "task failed"
    );
}

/// How many times to run an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. Zero attempts is rejected.
    pub fn new(max_attempts: u32, delay: Duration) -> TaskResult<Self> {
        if max_attempts == 0 {
            return Err(TaskError::invalid_config("max_attempts must be at least 1"));
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    /// A single attempt, no retries.
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Get the maximum number of attempts.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the delay between attempts.
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Submits retrying operations to a pool.
///
/// # Example
///
/// ```
/// use batt_tasks::{PoolConfig, Retrier, RetryPolicy, WorkerPool};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = WorkerPool::new(PoolConfig::new(4)).unwrap();
/// let retrier = Retrier::new(pool.clone());
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(1)).unwrap();
/// let handle = retrier
///     .process("ping", || async { Ok::<_, std::io::Error>(()) }, policy)
///     .await
///     .unwrap();
///
/// assert!(handle.join().await.unwrap().is_success());
/// pool.shutdown().await;
/// # }
/// ```
#[derive(Clone)]
pub struct Retrier {
    pool: WorkerPool,
    hook: ErrorHook,
}

impl Retrier {
    /// Create a retrier that logs failures.
    pub fn new(pool: WorkerPool) -> Self {
        Self {
            pool,
            hook: Arc::new(log_failure),
        }
    }

    /// Replace the error hook.
    #[must_use]
    pub fn with_hook(mut self, hook: impl Fn(&TaskFailure) + Send + Sync + 'static) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    /// Get the pool tasks are submitted to.
    pub const fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Queue `operation` to run under `policy`.
    ///
    /// Waits for queue space. Operation errors never come back from this
    /// call; they reach the error hook and the handle's outcome.
    pub async fn process<F, Fut, E>(
        &self,
        name: impl Into<String>,
        operation: F,
        policy: RetryPolicy,
    ) -> TaskResult<TaskHandle>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let id = TaskId::new();
        let name = name.into();
        let (report, outcome) = oneshot::channel();

        let job = run_with_retries(
            id,
            name.clone(),
            operation,
            policy,
            Arc::clone(&self.hook),
            self.pool.shared_stats(),
            report,
        );
        self.pool.submit(job).await?;

        debug!(task_id = %id, task_name = %name, "task submitted");
        Ok(TaskHandle::new(id, name, outcome))
    }
}

async fn run_with_retries<F, Fut, E>(
    id: TaskId,
    name: String,
    operation: F,
    policy: RetryPolicy,
    hook: ErrorHook,
    stats: Arc<crate::task::TaskStats>,
    report: oneshot::Sender<TaskOutcome>,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut attempt = 1;
    let error = loop {
        match operation().await {
            Ok(()) => {
                stats.record_succeeded();
                let _ = report.send(TaskOutcome::Succeeded { attempts: attempt });
                return;
            }
            Err(err) if attempt >= policy.max_attempts => break err,
            Err(err) => {
                debug!(task_id = %id, attempt, error = %err, "attempt failed, retrying");
                stats.record_retry();
                attempt += 1;
                tokio::time::sleep(policy.delay).await;
            }
        }
    };

    let failure = TaskFailure {
        id,
        name,
        attempts: attempt,
        error: Box::new(error),
    };
    stats.record_failed();
    hook(&failure);
    let _ = report.send(TaskOutcome::Failed(failure));
}

impl std::fmt::Debug for Retrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrier")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(matches!(
            RetryPolicy::new(0, Duration::from_secs(1)),
            Err(TaskError::InvalidConfig(_))
        ));

        let policy = RetryPolicy::new(3, Duration::from_millis(5)).unwrap();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_millis(5));
        assert_eq!(RetryPolicy::once().max_attempts(), 1);
    }
}
