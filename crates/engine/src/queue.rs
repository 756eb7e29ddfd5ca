//! FIFO job queue shared between the submission path and the worker pool.
//!
//! Built on an unbounded `tokio::sync::mpsc` channel: enqueue never blocks,
//! and putting the single receiver behind a mutex means a job is handed to
//! exactly one worker. Dequeue waits are bounded so workers can observe the
//! pool's running flag between attempts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

use quern_core::types::DbId;

use crate::error::EngineError;

/// A job as it travels from submission to a worker: the persisted id plus
/// everything a handler needs.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub id: DbId,
    pub job_type: String,
    pub input: Value,
}

/// Thread-safe FIFO of pending jobs.
pub struct JobQueue {
    tx: mpsc::UnboundedSender<QueuedJob>,
    rx: Mutex<mpsc::UnboundedReceiver<QueuedJob>>,
    depth: AtomicUsize,
}

impl JobQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            depth: AtomicUsize::new(0),
        }
    }

    /// Append a job; never blocks the caller.
    pub fn enqueue(&self, job: QueuedJob) -> Result<(), EngineError> {
        self.tx.send(job).map_err(|_| EngineError::QueueClosed)?;
        self.depth.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Wait up to `wait` for the next job.
    ///
    /// Returns `None` on timeout. Timing out is not an error; it is how
    /// idle workers get a chance to re-check the running flag.
    pub async fn dequeue(&self, wait: Duration) -> Option<QueuedJob> {
        let mut rx = self.rx.lock().await;
        match tokio::time::timeout(wait, rx.recv()).await {
            Ok(Some(job)) => {
                self.depth.fetch_sub(1, Ordering::Relaxed);
                Some(job)
            }
            // Channel closed or timeout: either way, no job this round.
            Ok(None) | Err(_) => None,
        }
    }

    /// Number of jobs currently waiting.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use serde_json::json;

    fn job(id: DbId) -> QueuedJob {
        QueuedJob {
            id,
            job_type: "analysis".to_string(),
            input: json!({}),
        }
    }

    #[tokio::test]
    async fn preserves_fifo_order() {
        let queue = JobQueue::new();
        for id in 1..=5 {
            queue.enqueue(job(id)).unwrap();
        }
        assert_eq!(queue.depth(), 5);

        for expected in 1..=5 {
            let got = queue.dequeue(Duration::from_millis(100)).await.unwrap();
            assert_eq!(got.id, expected);
        }
        assert_eq!(queue.depth(), 0);
    }

    #[tokio::test]
    async fn dequeue_times_out_with_none() {
        let queue = JobQueue::new();
        let start = std::time::Instant::now();
        assert!(queue.dequeue(Duration::from_millis(20)).await.is_none());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_never_share_a_job() {
        const JOBS: DbId = 200;
        const CONSUMERS: usize = 4;

        let queue = Arc::new(JobQueue::new());
        for id in 0..JOBS {
            queue.enqueue(job(id)).unwrap();
        }

        let mut tasks = Vec::new();
        for _ in 0..CONSUMERS {
            let queue = Arc::clone(&queue);
            tasks.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(job) = queue.dequeue(Duration::from_millis(50)).await {
                    seen.push(job.id);
                }
                seen
            }));
        }

        let mut all = HashSet::new();
        let mut total = 0;
        for task in tasks {
            for id in task.await.unwrap() {
                assert!(all.insert(id), "job {id} was delivered twice");
                total += 1;
            }
        }
        assert_eq!(total, JOBS);
    }
}
