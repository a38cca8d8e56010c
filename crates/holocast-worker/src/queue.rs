//! Bounded job queue with a semaphore-capped worker pool.
//!
//! `try_submit` applies backpressure: when the channel is full the caller
//! gets a service-unavailable error instead of an unbounded task spawn.

use holocast_core::AppError;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use crate::runner::JobRunner;

#[derive(Debug, Clone)]
pub enum HologramJob {
    Composite { project_id: Uuid },
}

pub struct JobQueue {
    tx: mpsc::Sender<HologramJob>,
    /// Holds the receiver open for consumerless queues (e.g. `dummy`) so the
    /// channel stays alive. `None` when a worker pool owns the receiver.
    _rx: Option<mpsc::Receiver<HologramJob>>,
}

impl JobQueue {
    /// Create a queue with a bounded channel and spawn its worker pool.
    ///
    /// `queue_size` bounds how many accepted jobs may wait; `max_concurrent`
    /// bounds how many run at once.
    pub fn new(runner: Arc<JobRunner>, queue_size: usize, max_concurrent: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_size.max(1));

        tokio::spawn(async move {
            Self::worker_pool(rx, runner, max_concurrent.max(1)).await;
        });

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = max_concurrent,
            "Job queue initialized with bounded channel"
        );

        Self { tx, _rx: None }
    }

    /// Queue with no consumer; jobs fill the (capacity 1) channel and are
    /// never run. For tests exercising submission behavior.
    pub fn dummy() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            _rx: Some(rx),
        }
    }

    /// Submit a job without waiting. A full queue is reported to the
    /// caller rather than queued unboundedly.
    #[tracing::instrument(skip(self), fields(job.type = "composite"))]
    pub fn try_submit(&self, job: HologramJob) -> Result<(), AppError> {
        match &job {
            HologramJob::Composite { project_id } => {
                tracing::info!(project_id = %project_id, "Enqueuing compositing job");
            }
        }
        self.tx.try_send(job).map_err(|e| match &e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Job queue is full, rejecting job");
                AppError::ServiceUnavailable(
                    "Processing queue is full, please try again later".to_string(),
                )
            }
            _ => AppError::Internal(format!("Failed to submit job: {}", e)),
        })
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<HologramJob>,
        runner: Arc<JobRunner>,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job) = rx.recv().await {
            let permit = semaphore.clone().acquire_owned().await;
            let runner = runner.clone();

            tokio::spawn(async move {
                let _permit = permit;
                match job {
                    HologramJob::Composite { project_id } => {
                        runner.execute(project_id).await;
                    }
                }
            });
        }

        tracing::info!("Job queue worker pool stopped");
    }
}

impl Clone for JobQueue {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            _rx: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_submit_rejects_when_full() {
        let queue = JobQueue::dummy();
        let job = HologramJob::Composite {
            project_id: Uuid::new_v4(),
        };

        assert!(queue.try_submit(job.clone()).is_ok());
        match queue.try_submit(job) {
            Err(AppError::ServiceUnavailable(msg)) => {
                assert!(msg.contains("queue is full"));
            }
            other => panic!("expected ServiceUnavailable, got {:?}", other.err()),
        }
    }
}
