#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model already exists: {0}")]
    AlreadyExists(String),

    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Unsupported model type: {0}")]
    UnsupportedKind(String),

    #[error("Model {0} is not trained")]
    Untrained(String),

    #[error("Invalid training data: {0}")]
    InvalidTraining(String),

    #[error("Feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Model persistence failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
