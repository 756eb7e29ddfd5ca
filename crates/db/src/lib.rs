//! Durable job store for the quern engine, backed by sqlx + SQLite.
//!
//! The engine treats this crate as a narrow interface: insert a job and get
//! an id back, flip its status, and fetch it by id. Each call is atomic;
//! SQLite provides the transactional guarantees.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub use models::job::JobRecord;
pub use models::status::JobStatus;
pub use repositories::job_repo::JobRepo;

/// Default connection pool size for file-backed databases.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Open (creating if missing) the database at `database_url`,
/// e.g. `sqlite://quern.db`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .connect_with(options)
        .await?;
    tracing::info!(database_url, "Connected to job store");
    Ok(pool)
}

/// Open a private in-memory database.
///
/// Limited to a single connection: each SQLite `:memory:` connection is its
/// own database, so a larger pool would see different (empty) schemas.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
}

/// Apply all pending migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap connectivity probe.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
