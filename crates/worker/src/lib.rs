//! RoboFleet background task worker.
//!
//! Runs from the `task_runs` table instead of an external broker:
//!
//! - [`runner`] claims queued runs and executes them under a time limit.
//! - [`scheduler`] enqueues the periodic fleet health check and scheduled
//!   mission processing.
//! - [`tasks`] holds the task bodies themselves.
//!
//! [`shutdown::signal`] is the termination trigger for both binaries.
//!
//! The standalone `robofleet-worker` binary and the API's embedded mode both
//! go through [`spawn`].

use std::sync::Arc;

use robofleet_db::DbPool;
use robofleet_events::EventBus;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub mod config;
pub mod error;
pub mod runner;
pub mod scheduler;
pub mod shutdown;
pub mod tasks;

pub use config::WorkerConfig;
pub use error::TaskError;

/// Spawn the queue runner and the scheduler.
///
/// Both loops exit once `cancel` is triggered; await the returned handles
/// to wait for in-flight work to finish.
pub fn spawn(
    pool: DbPool,
    bus: Arc<EventBus>,
    config: WorkerConfig,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let runner = tokio::spawn(runner::run(
        pool.clone(),
        Arc::clone(&bus),
        config.poll_interval,
        cancel.clone(),
    ));
    let scheduler = tokio::spawn(scheduler::run(pool, config, cancel));
    vec![runner, scheduler]
}
