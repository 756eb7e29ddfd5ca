//! Round-trip tests for the job store against an in-memory database.

use serde_json::json;

use quern_db::{connect_in_memory, health_check, migrate, JobRepo, JobStatus};

async fn test_pool() -> sqlx::SqlitePool {
    let pool = connect_in_memory().await.unwrap();
    migrate(&pool).await.unwrap();
    pool
}

#[tokio::test]
async fn insert_assigns_monotonically_increasing_ids() {
    let pool = test_pool().await;

    let first = JobRepo::insert(&pool, 1, "analysis", &json!({"data_points": [1, 2]}))
        .await
        .unwrap();
    let second = JobRepo::insert(&pool, 1, "transform", &json!({"type": "flatten"}))
        .await
        .unwrap();

    assert!(second > first, "ids must increase: {first} then {second}");
}

#[tokio::test]
async fn inserted_job_starts_pending_with_its_input() {
    let pool = test_pool().await;

    let input = json!({"data_points": [1, 2, 3], "note": "hello"});
    let id = JobRepo::insert(&pool, 7, "analysis", &input).await.unwrap();

    let record = JobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.owner_id, 7);
    assert_eq!(record.job_type, "analysis");
    assert_eq!(record.status, JobStatus::Pending);
    assert_eq!(record.input, input);
    assert!(record.output.is_none());
    assert!(record.error.is_none());
    assert!(record.completed_at.is_none());
}

#[tokio::test]
async fn complete_writes_terminal_state_and_output() {
    let pool = test_pool().await;
    let id = JobRepo::insert(&pool, 1, "analysis", &json!({})).await.unwrap();

    JobRepo::mark_running(&pool, id).await.unwrap();
    let running = JobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(running.status, JobStatus::Running);

    let output = json!({"analysis": {"count": 3}});
    JobRepo::complete(&pool, id, &output, 42).await.unwrap();

    let record = JobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Done);
    assert!(record.status.is_terminal());
    assert_eq!(record.output, Some(output));
    assert_eq!(record.duration_ms, Some(42));
    assert!(record.completed_at.is_some());
}

#[tokio::test]
async fn fail_records_the_error_description() {
    let pool = test_pool().await;
    let id = JobRepo::insert(&pool, 1, "bogus", &json!({})).await.unwrap();

    JobRepo::fail(&pool, id, "Unknown job type: bogus", 3)
        .await
        .unwrap();

    let record = JobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error.as_deref(), Some("Unknown job type: bogus"));
    assert!(record.output.is_none());
}

#[tokio::test]
async fn find_by_unknown_id_returns_none() {
    let pool = test_pool().await;
    assert!(JobRepo::find_by_id(&pool, 9999).await.unwrap().is_none());
}

#[tokio::test]
async fn health_check_succeeds_on_open_pool() {
    let pool = test_pool().await;
    health_check(&pool).await.unwrap();
}
