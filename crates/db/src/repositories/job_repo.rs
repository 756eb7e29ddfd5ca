//! Repository for the `jobs` table.
//!
//! Every status literal goes through [`JobStatus`]; callers never see raw
//! column text. The store is authoritative for job existence and terminal
//! status; the engine's in-memory result cache is only a fast path.

use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqlitePool;

use quern_core::types::DbId;

use crate::models::job::JobRecord;
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, owner_id, job_type, status, input, output, error, duration_ms, \
    created_at, completed_at";

/// CRUD operations for persisted jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new pending job and return its assigned id.
    pub async fn insert(
        pool: &SqlitePool,
        owner_id: DbId,
        job_type: &str,
        input: &Value,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO jobs (owner_id, job_type, status, input, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING id",
        )
        .bind(owner_id)
        .bind(job_type)
        .bind(JobStatus::Pending.as_str())
        .bind(input.to_string())
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Flip a job to `running` when a worker picks it up.
    pub async fn mark_running(pool: &SqlitePool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET status = ?1 WHERE id = ?2")
            .bind(JobStatus::Running.as_str())
            .bind(job_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful outcome: terminal status, output payload,
    /// duration and completion time.
    pub async fn complete(
        pool: &SqlitePool,
        job_id: DbId,
        output: &Value,
        duration_ms: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status = ?1, output = ?2, duration_ms = ?3, completed_at = ?4 \
             WHERE id = ?5",
        )
        .bind(JobStatus::Done.as_str())
        .bind(output.to_string())
        .bind(duration_ms)
        .bind(Utc::now())
        .bind(job_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed outcome with its error description.
    pub async fn fail(
        pool: &SqlitePool,
        job_id: DbId,
        error: &str,
        duration_ms: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status = ?1, error = ?2, duration_ms = ?3, completed_at = ?4 \
             WHERE id = ?5",
        )
        .bind(JobStatus::Failed.as_str())
        .bind(error)
        .bind(duration_ms)
        .bind(Utc::now())
        .bind(job_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a job by its id.
    pub async fn find_by_id(
        pool: &SqlitePool,
        job_id: DbId,
    ) -> Result<Option<JobRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = ?1");
        sqlx::query_as::<_, JobRecord>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }
}
