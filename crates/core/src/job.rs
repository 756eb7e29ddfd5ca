//! Job type tags and execution outcomes.
//!
//! A job is one unit of requested work: a type tag plus an arbitrary JSON
//! input payload. The engine dispatches on [`JobKind`] and records a
//! [`JobOutcome`] per executed job.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// JobKind
// ---------------------------------------------------------------------------

/// The set of job types the engine knows how to execute.
///
/// Tags arrive as free-form strings from submitters; parsing an unknown tag
/// yields [`UnknownJobType`], which the dispatcher converts into a failed
/// outcome rather than a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Descriptive statistics over a sequence of data points.
    Analysis,
    /// Normalize / flatten / aggregate a payload.
    Transform,
    /// GET or POST against a named peer service.
    CrossServiceCall,
    /// Delegate to a trained model in the registry.
    MlPrediction,
}

impl JobKind {
    /// Wire tag for this kind, as stored in the job table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Transform => "transform",
            Self::CrossServiceCall => "cross_service_call",
            Self::MlPrediction => "ml_prediction",
        }
    }
}

/// Error for a job type tag that maps to no handler.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown job type: {0}")]
pub struct UnknownJobType(pub String);

impl FromStr for JobKind {
    type Err = UnknownJobType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analysis" => Ok(Self::Analysis),
            "transform" => Ok(Self::Transform),
            "cross_service_call" => Ok(Self::CrossServiceCall),
            "ml_prediction" => Ok(Self::MlPrediction),
            other => Err(UnknownJobType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// JobOutcome
// ---------------------------------------------------------------------------

/// Success payload or failure description for one executed job.
///
/// Exactly one of the two is ever present; the enum makes that structural.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The success payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// The failure description, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(message) => Some(message),
        }
    }
}

/// The recorded result of executing one job.
///
/// Written exactly once, by the worker that executed the job. Processing
/// time is measured from dequeue to completion.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job_id: DbId,
    pub outcome: Outcome,
    pub processing_time: Duration,
    pub completed_at: Timestamp,
}

impl JobOutcome {
    pub fn success(job_id: DbId, payload: Value, processing_time: Duration) -> Self {
        Self {
            job_id,
            outcome: Outcome::Success(payload),
            processing_time,
            completed_at: Utc::now(),
        }
    }

    pub fn failure(job_id: DbId, error: impl Into<String>, processing_time: Duration) -> Self {
        Self {
            job_id,
            outcome: Outcome::Failure(error.into()),
            processing_time,
            completed_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_wire_tag() {
        for kind in [
            JobKind::Analysis,
            JobKind::Transform,
            JobKind::CrossServiceCall,
            JobKind::MlPrediction,
        ] {
            assert_eq!(kind.as_str().parse::<JobKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_tag_is_a_described_error() {
        let err = "compress".parse::<JobKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown job type: compress");
    }

    #[test]
    fn outcome_exposes_exactly_one_side() {
        let ok = JobOutcome::success(1, serde_json::json!({"n": 3}), Duration::from_millis(5));
        assert!(ok.outcome.is_success());
        assert!(ok.outcome.payload().is_some());
        assert!(ok.outcome.error().is_none());

        let failed = JobOutcome::failure(2, "boom", Duration::from_millis(5));
        assert!(!failed.outcome.is_success());
        assert!(failed.outcome.payload().is_none());
        assert_eq!(failed.outcome.error(), Some("boom"));
    }
}
