//! In-memory cache of job outcomes, keyed by job id.
//!
//! This is a cache, not the source of truth: the durable job store keeps
//! the authoritative terminal status. Each entry is written exactly once,
//! by the worker that executed the job.

use std::collections::HashMap;

use tokio::sync::RwLock;

use quern_core::job::JobOutcome;
use quern_core::types::DbId;

#[derive(Default)]
pub struct ResultStore {
    entries: RwLock<HashMap<DbId, JobOutcome>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome under its job id.
    pub async fn record(&self, outcome: JobOutcome) {
        let mut entries = self.entries.write().await;
        entries.insert(outcome.job_id, outcome);
    }

    /// Fetch a copy of the outcome for `job_id`, if present.
    pub async fn get(&self, job_id: DbId) -> Option<JobOutcome> {
        let entries = self.entries.read().await;
        entries.get(&job_id).cloned()
    }

    /// Number of cached outcomes.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
