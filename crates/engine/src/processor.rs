//! The engine's front door: submit jobs, fetch results, run the pool.

use std::sync::Arc;

use serde_json::Value;
use sqlx::sqlite::SqlitePool;

use quern_core::job::JobOutcome;
use quern_core::types::DbId;
use quern_db::{JobRecord, JobRepo};
use quern_ml::ModelRegistry;
use quern_remote::PeerServices;

use crate::dispatch::HandlerContext;
use crate::error::EngineError;
use crate::pool::{PoolConfig, PoolStats, WorkerPool};
use crate::queue::{JobQueue, QueuedJob};
use crate::result_store::ResultStore;

/// Where a result came from.
#[derive(Debug)]
pub enum JobResult {
    /// Outcome served from the in-memory cache (this process executed it).
    Fresh(JobOutcome),
    /// Row served from the durable store; carries whatever status the job
    /// has there, terminal or not.
    Stored(JobRecord),
}

/// One long-lived processor per process: owns the queue, the result cache
/// and the worker pool, and is handed by reference to every call site.
pub struct JobProcessor {
    db: SqlitePool,
    queue: Arc<JobQueue>,
    results: Arc<ResultStore>,
    pool: WorkerPool,
}

impl JobProcessor {
    pub fn new(
        db: SqlitePool,
        registry: Arc<ModelRegistry>,
        services: Arc<PeerServices>,
        config: PoolConfig,
    ) -> Self {
        let queue = Arc::new(JobQueue::new());
        let results = Arc::new(ResultStore::new());
        let ctx = Arc::new(HandlerContext { registry, services });
        let pool = WorkerPool::new(
            db.clone(),
            Arc::clone(&queue),
            Arc::clone(&results),
            ctx,
            config,
        );
        Self {
            db,
            queue,
            results,
            pool,
        }
    }

    /// Persist a job, enqueue it, and return its assigned id.
    ///
    /// The id comes back synchronously; processing happens on the pool.
    pub async fn submit(
        &self,
        owner_id: DbId,
        job_type: &str,
        input: Value,
    ) -> Result<DbId, EngineError> {
        let id = JobRepo::insert(&self.db, owner_id, job_type, &input).await?;
        self.queue.enqueue(QueuedJob {
            id,
            job_type: job_type.to_string(),
            input,
        })?;
        tracing::info!(job_id = id, job_type, owner_id, "Job submitted");
        Ok(id)
    }

    /// Fetch the result for `job_id`: result cache first, durable store
    /// as fallback.
    pub async fn result(&self, job_id: DbId) -> Result<JobResult, EngineError> {
        if let Some(outcome) = self.results.get(job_id).await {
            return Ok(JobResult::Fresh(outcome));
        }
        match JobRepo::find_by_id(&self.db, job_id).await? {
            Some(record) => Ok(JobResult::Stored(record)),
            None => Err(EngineError::ResultNotReady(job_id)),
        }
    }

    /// Start the worker pool (idempotent).
    pub async fn start(&self) {
        self.pool.start().await;
    }

    /// Cooperatively stop the pool.
    pub fn stop(&self) {
        self.pool.stop();
    }

    /// Stop the pool and wait for workers to exit.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
