//! Bounded worker pool.
//!
//! Submitted jobs go into a bounded queue. A dispatcher task takes them off
//! the queue and runs each one on the runtime once a worker slot (a semaphore
//! permit) is free, so at most `max_workers` jobs run at a time.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{TaskError, TaskResult};
use crate::task::TaskStats;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Configuration for a [`WorkerPool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Maximum number of jobs running at once.
    pub max_workers: usize,
    /// Maximum number of jobs waiting to run.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 16,
            queue_capacity: 1024,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with `max_workers` and the default queue.
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            ..Self::default()
        }
    }

    /// Set the queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Check the configuration.
    pub fn validate(&self) -> TaskResult<()> {
        if self.max_workers == 0 {
            return Err(TaskError::invalid_config("max_workers must be at least 1"));
        }
        if u32::try_from(self.max_workers).is_err() {
            return Err(TaskError::invalid_config(format!(
                "max_workers must be at most {}",
                u32::MAX
            )));
        }
        if self.queue_capacity == 0 {
            return Err(TaskError::invalid_config(
                "queue_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A pool running at most `max_workers` jobs concurrently.
///
/// Cheap to clone; clones share the pool. Must be created inside a Tokio
/// runtime.
///
/// # Example
///
/// ```
/// use batt_tasks::{PoolConfig, WorkerPool};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = WorkerPool::new(PoolConfig::new(4)).unwrap();
/// pool.submit(async { /* work */ }).await.unwrap();
///
/// pool.shutdown().await;
/// assert_eq!(pool.stats().total_completed(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    config: PoolConfig,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    dispatcher: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    stats: Arc<TaskStats>,
}

impl WorkerPool {
    /// Create a pool and start its dispatcher.
    pub fn new(config: PoolConfig) -> TaskResult<Self> {
        config.validate()?;

        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let stats = Arc::new(TaskStats::new());
        let dispatcher = tokio::spawn(dispatch(
            receiver,
            Arc::new(Semaphore::new(config.max_workers)),
            config.max_workers,
            Arc::clone(&stats),
        ));

        debug!(
            max_workers = config.max_workers,
            queue_capacity = config.queue_capacity,
            "worker pool started"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                config,
                sender: Mutex::new(Some(sender)),
                dispatcher: tokio::sync::Mutex::new(Some(dispatcher)),
                stats,
            }),
        })
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Get the pool statistics.
    pub fn stats(&self) -> &TaskStats {
        &self.inner.stats
    }

    pub(crate) fn shared_stats(&self) -> Arc<TaskStats> {
        Arc::clone(&self.inner.stats)
    }

    /// Check if the pool has been shut down.
    pub fn is_closed(&self) -> bool {
        self.inner.sender.lock().is_none()
    }

    fn sender(&self) -> TaskResult<mpsc::Sender<Job>> {
        self.inner
            .sender
            .lock()
            .as_ref()
            .cloned()
            .ok_or(TaskError::PoolClosed)
    }

    /// Queue a job, waiting for room if the queue is full.
    pub async fn submit<F>(&self, job: F) -> TaskResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.sender()?
            .send(Box::pin(job))
            .await
            .map_err(|_| TaskError::PoolClosed)?;
        self.inner.stats.record_submitted();
        Ok(())
    }

    /// Queue a job, failing with [`TaskError::QueueFull`] instead of waiting.
    pub fn try_submit<F>(&self, job: F) -> TaskResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.sender()?
            .try_send(Box::pin(job))
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => {
                    TaskError::QueueFull(self.inner.config.queue_capacity)
                }
                mpsc::error::TrySendError::Closed(_) => TaskError::PoolClosed,
            })?;
        self.inner.stats.record_submitted();
        Ok(())
    }

    /// Stop accepting jobs and wait for every queued and running job.
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let sender = self.inner.sender.lock().take();
        if sender.is_none() {
            return;
        }
        drop(sender);
        info!("shutting down worker pool");

        let dispatcher = self.inner.dispatcher.lock().await.take();
        if let Some(dispatcher) = dispatcher {
            if let Err(err) = dispatcher.await {
                warn!(error = %err, "worker pool dispatcher ended abnormally");
            }
        }

        info!(
            completed = self.inner.stats.total_completed(),
            "worker pool shutdown complete"
        );
    }
}

async fn dispatch(
    mut receiver: mpsc::Receiver<Job>,
    slots: Arc<Semaphore>,
    max_workers: usize,
    stats: Arc<TaskStats>,
) {
    while let Some(job) = receiver.recv().await {
        let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
            break;
        };
        let stats = Arc::clone(&stats);
        tokio::spawn(async move {
            job.await;
            stats.record_completed();
            drop(permit);
        });
    }

    // Every permit back means every job has finished.
    let all = u32::try_from(max_workers).unwrap_or(u32::MAX);
    if slots.acquire_many(all).await.is_err() {
        warn!("worker slots closed while draining");
    }
    debug!("worker pool drained");
}
