//! `quern-worker` -- job-processing daemon.
//!
//! Connects to the job store, seeds the default model registry, and runs
//! the worker pool until interrupted. Jobs are submitted by other
//! processes through the shared database + engine library.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default                 | Description                      |
//! |----------------------|----------|-------------------------|----------------------------------|
//! | `DATABASE_URL`       | no       | `sqlite://quern.db`     | Job store location               |
//! | `WORKER_COUNT`       | no       | `3`                     | Concurrent workers in the pool   |
//! | `DEQUEUE_TIMEOUT_MS` | no       | `1000`                  | Bound on one idle dequeue wait   |
//! | `WEB_API_URL`        | no       | `http://localhost:3000` | Base URL of the web peer service |
//! | `DATA_API_URL`       | no       | `http://localhost:8080` | Base URL of the data peer service|

mod config;

use std::sync::Arc;
use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quern_core::metrics;
use quern_engine::{JobProcessor, PoolConfig};
use quern_ml::ModelRegistry;
use quern_remote::PeerServices;

use config::WorkerConfig;

/// Seconds between pool status log lines.
const STATS_INTERVAL_SECS: u64 = 30;

/// Model names registered at startup, one per supported family.
const DEFAULT_MODELS: [&str; 2] = ["linear_regression", "binary_classifier"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quern_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(
        database_url = %config.database_url,
        workers = config.worker_count,
        "Starting quern-worker",
    );

    let db = quern_db::connect(&config.database_url).await?;
    quern_db::migrate(&db).await?;
    quern_db::health_check(&db).await?;

    let registry = Arc::new(ModelRegistry::new());
    for name in DEFAULT_MODELS {
        // Default models double as the kind tag for prediction jobs that
        // do not name a model. They start untrained.
        registry.create(name, name).await?;
    }
    let seeded = registry.list().await.len();
    tracing::info!(models = seeded, "Model registry seeded");

    let services = Arc::new(PeerServices::new(
        config.web_api_url.clone(),
        config.data_api_url.clone(),
    )?);

    let processor = JobProcessor::new(
        db,
        registry,
        services,
        PoolConfig {
            workers: config.worker_count,
            dequeue_timeout: config.dequeue_timeout,
        },
    );
    processor.start().await;

    let started = Instant::now();
    let mut ticker =
        tokio::time::interval(std::time::Duration::from_secs(STATS_INTERVAL_SECS));
    // The first tick fires immediately; skip it so the first report
    // covers a full interval.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let stats = processor.stats();
                let processed = stats.succeeded + stats.failed;
                tracing::info!(
                    queued = stats.queued,
                    succeeded = stats.succeeded,
                    failed = stats.failed,
                    success_rate = stats.success_rate,
                    throughput = metrics::throughput(processed, started.elapsed().as_secs_f64()),
                    "Pool status",
                );
            }
        }
    }

    tracing::info!("Interrupt received; shutting down");
    processor.shutdown().await;
    Ok(())
}
