use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The bare description of a validation failure, without the
    /// `Validation failed:` prefix. Handlers report this text directly
    /// in job error payloads.
    pub fn description(&self) -> String {
        match self {
            CoreError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
