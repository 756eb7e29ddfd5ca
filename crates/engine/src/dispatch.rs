//! Maps a job's type tag to its handler.
//!
//! Dispatch is a pure tag → function mapping; all state a handler needs
//! arrives through [`HandlerContext`]. An unknown tag is an ordinary failed
//! outcome ("Unknown job type: …"), never a fault that could take down a
//! worker.

use std::sync::Arc;

use serde_json::Value;

use quern_core::error::CoreError;
use quern_core::job::JobKind;
use quern_ml::{ModelError, ModelRegistry};
use quern_remote::PeerServices;

use crate::handlers;

/// Shared collaborators handlers may call into.
pub struct HandlerContext {
    pub registry: Arc<ModelRegistry>,
    pub services: Arc<PeerServices>,
}

/// A handler's description of why a job failed.
///
/// Rendered with `to_string` into the outcome's error field.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Unknown job type: {0}")]
    UnknownJobType(String),

    /// Malformed or missing input; nothing was executed.
    #[error("{0}")]
    Invalid(String),

    /// The cross-service request failed in transport.
    #[error("Service call failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for HandlerError {
    fn from(err: CoreError) -> Self {
        HandlerError::Invalid(err.description())
    }
}

/// Resolve `job_type` and execute the matching handler on `input`.
pub async fn run_handler(
    job_type: &str,
    input: &Value,
    ctx: &HandlerContext,
) -> Result<Value, HandlerError> {
    let kind: JobKind = job_type
        .parse()
        .map_err(|_| HandlerError::UnknownJobType(job_type.to_string()))?;

    match kind {
        JobKind::Analysis => handlers::analysis::run(input),
        JobKind::Transform => handlers::transform::run(input),
        JobKind::CrossServiceCall => handlers::remote_call::run(input, &ctx.services).await,
        JobKind::MlPrediction => handlers::prediction::run(input, &ctx.registry).await,
    }
}
