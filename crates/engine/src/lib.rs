//! The job-processing engine: queue, dispatch, worker pool and results.
//!
//! Control flow: [`JobProcessor::submit`] persists a job in the durable
//! store, then enqueues it on the shared [`JobQueue`]. An idle worker in the
//! [`WorkerPool`] dequeues it, resolves its type tag to a handler, executes
//! it, and records the outcome in both the [`ResultStore`] cache and the
//! durable store. [`JobProcessor::result`] reads the cache first and falls
//! back to the store.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod pool;
pub mod processor;
pub mod queue;
pub mod result_store;

pub use dispatch::{HandlerContext, HandlerError};
pub use error::EngineError;
pub use pool::{PoolConfig, PoolStats, WorkerPool};
pub use processor::{JobProcessor, JobResult};
pub use queue::{JobQueue, QueuedJob};
pub use result_store::ResultStore;
