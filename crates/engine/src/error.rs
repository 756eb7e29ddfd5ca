use quern_core::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The id matches nothing in the result cache or the durable store.
    #[error("Job {0} not found or still processing")]
    ResultNotReady(DbId),

    /// The queue's receiving side is gone; no worker will ever pick the
    /// job up.
    #[error("Job queue is closed")]
    QueueClosed,

    #[error("Job store error: {0}")]
    Database(#[from] sqlx::Error),
}
