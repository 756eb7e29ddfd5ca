//! Row model for the `jobs` table.

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use quern_core::types::{DbId, Timestamp};

use super::status::JobStatus;

/// A row from the `jobs` table.
///
/// `input` and `output` are stored as serialized JSON TEXT; decoding
/// happens here so repository callers only ever see structured values.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: DbId,
    pub owner_id: DbId,
    pub job_type: String,
    pub status: JobStatus,
    pub input: Value,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

fn decode_json(index: &'static str, text: &str) -> Result<Value, sqlx::Error> {
    serde_json::from_str(text).map_err(|e| sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(e),
    })
}

impl sqlx::FromRow<'_, SqliteRow> for JobRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status_text: String = row.try_get("status")?;
        let status = status_text
            .parse::<JobStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        let input_text: String = row.try_get("input")?;
        let input = decode_json("input", &input_text)?;

        let output = match row.try_get::<Option<String>, _>("output")? {
            Some(text) => Some(decode_json("output", &text)?),
            None => None,
        };

        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            job_type: row.try_get("job_type")?,
            status,
            input,
            output,
            error: row.try_get("error")?,
            duration_ms: row.try_get("duration_ms")?,
            created_at: row.try_get("created_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}
