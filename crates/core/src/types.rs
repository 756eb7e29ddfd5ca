/// All durable-store primary keys are SQLite 64-bit rowids.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
