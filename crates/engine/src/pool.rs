//! Fixed-size worker pool draining the job queue.
//!
//! Each worker is a tokio task looping "dequeue with timeout, process,
//! repeat". A handler error, or even a panic, becomes a failed outcome
//! for that one job; the worker itself keeps serving. `stop` is
//! cooperative: workers notice the flag at their next dequeue timeout, and
//! an in-flight job always runs to completion.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use sqlx::sqlite::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use quern_core::job::{JobOutcome, Outcome};
use quern_core::metrics;
use quern_db::JobRepo;

use crate::dispatch::{self, HandlerContext};
use crate::queue::{JobQueue, QueuedJob};
use crate::result_store::ResultStore;

/// Workers spawned when the config does not say otherwise.
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Default bound on one dequeue wait; also the latency with which idle
/// workers observe `stop`.
pub const DEFAULT_DEQUEUE_TIMEOUT: Duration = Duration::from_secs(1);

/// Error text recorded when a handler panics instead of returning.
const PANIC_OUTCOME: &str = "Internal error: job handler panicked";

/// Sizing and timing knobs for the pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub workers: usize,
    pub dequeue_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            dequeue_timeout: DEFAULT_DEQUEUE_TIMEOUT,
        }
    }
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    pub queued: usize,
    pub succeeded: u64,
    pub failed: u64,
    /// Percentage of processed jobs that succeeded.
    pub success_rate: f64,
}

/// Everything a worker task needs, shared across the pool.
struct Shared {
    queue: Arc<JobQueue>,
    results: Arc<ResultStore>,
    ctx: Arc<HandlerContext>,
    db: SqlitePool,
    running: AtomicBool,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Fixed set of concurrent workers owning the run/stop lifecycle.
pub struct WorkerPool {
    shared: Arc<Shared>,
    config: PoolConfig,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(
        db: SqlitePool,
        queue: Arc<JobQueue>,
        results: Arc<ResultStore>,
        ctx: Arc<HandlerContext>,
        config: PoolConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue,
                results,
                ctx,
                db,
                running: AtomicBool::new(false),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
            config,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the workers. Idempotent: a second call while running is a
    /// no-op and spawns nothing.
    pub async fn start(&self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Worker pool already running; start ignored");
            return;
        }

        let mut handles = self.handles.lock().await;
        for worker_id in 0..self.config.workers {
            let shared = Arc::clone(&self.shared);
            let timeout = self.config.dequeue_timeout;
            handles.push(tokio::spawn(worker_loop(worker_id, shared, timeout)));
        }
        tracing::info!(workers = self.config.workers, "Worker pool started");
    }

    /// Ask workers to exit. They observe the flag at their next dequeue
    /// timeout; in-flight jobs are not interrupted.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        tracing::info!("Worker pool stopping");
    }

    /// Stop and wait for every worker to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        tracing::info!("Worker pool stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> PoolStats {
        let succeeded = self.shared.succeeded.load(Ordering::Relaxed);
        let failed = self.shared.failed.load(Ordering::Relaxed);
        PoolStats {
            queued: self.shared.queue.depth(),
            succeeded,
            failed,
            success_rate: metrics::success_rate(succeeded, succeeded + failed),
        }
    }
}

async fn worker_loop(worker_id: usize, shared: Arc<Shared>, timeout: Duration) {
    tracing::debug!(worker_id, "Worker started");
    while shared.running.load(Ordering::SeqCst) {
        let Some(job) = shared.queue.dequeue(timeout).await else {
            continue;
        };
        process_job(worker_id, &shared, job).await;
    }
    tracing::debug!(worker_id, "Worker exiting");
}

/// Execute one job and record its outcome: exactly one result-store write
/// per job, no matter how the handler fails.
async fn process_job(worker_id: usize, shared: &Shared, job: QueuedJob) {
    let started = Instant::now();
    tracing::info!(worker_id, job_id = job.id, job_type = %job.job_type, "Processing job");

    if let Err(e) = JobRepo::mark_running(&shared.db, job.id).await {
        tracing::error!(job_id = job.id, error = %e, "Failed to mark job running");
    }

    let handled =
        AssertUnwindSafe(dispatch::run_handler(&job.job_type, &job.input, &shared.ctx))
            .catch_unwind()
            .await;
    let processing_time = started.elapsed();
    let duration_ms = processing_time.as_millis() as i64;

    let outcome = match handled {
        Ok(Ok(payload)) => JobOutcome::success(job.id, payload, processing_time),
        Ok(Err(error)) => JobOutcome::failure(job.id, error.to_string(), processing_time),
        Err(_) => JobOutcome::failure(job.id, PANIC_OUTCOME, processing_time),
    };

    // Terminal status goes to the durable store first; the cache entry is
    // what unblocks result readers.
    let stored = match &outcome.outcome {
        Outcome::Success(payload) => {
            JobRepo::complete(&shared.db, job.id, payload, duration_ms).await
        }
        Outcome::Failure(message) => JobRepo::fail(&shared.db, job.id, message, duration_ms).await,
    };
    if let Err(e) = stored {
        tracing::error!(job_id = job.id, error = %e, "Failed to persist job outcome");
    }

    match &outcome.outcome {
        Outcome::Success(_) => {
            shared.succeeded.fetch_add(1, Ordering::Relaxed);
            tracing::info!(worker_id, job_id = job.id, duration_ms, "Job completed");
        }
        Outcome::Failure(message) => {
            shared.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(worker_id, job_id = job.id, duration_ms, error = %message, "Job failed");
        }
    }

    shared.results.record(outcome).await;
}
