//! Environment-driven configuration for the worker binary.

use std::time::Duration;

/// Database used when `DATABASE_URL` is not set.
const DEFAULT_DATABASE_URL: &str = "sqlite://quern.db";

/// Worker count used when `WORKER_COUNT` is not set.
const DEFAULT_WORKER_COUNT: usize = 3;

/// Dequeue timeout used when `DEQUEUE_TIMEOUT_MS` is not set.
const DEFAULT_DEQUEUE_TIMEOUT_MS: u64 = 1000;

/// Web peer base URL used when `WEB_API_URL` is not set.
const DEFAULT_WEB_API_URL: &str = "http://localhost:3000";

/// Data peer base URL used when `DATA_API_URL` is not set.
const DEFAULT_DATA_API_URL: &str = "http://localhost:8080";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub worker_count: usize,
    pub dequeue_timeout: Duration,
    pub web_api_url: String,
    pub data_api_url: String,
}

impl WorkerConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            worker_count: env_parsed("WORKER_COUNT", DEFAULT_WORKER_COUNT),
            dequeue_timeout: Duration::from_millis(env_parsed(
                "DEQUEUE_TIMEOUT_MS",
                DEFAULT_DEQUEUE_TIMEOUT_MS,
            )),
            web_api_url: env_or("WEB_API_URL", DEFAULT_WEB_API_URL),
            data_api_url: env_or("DATA_API_URL", DEFAULT_DATA_API_URL),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
