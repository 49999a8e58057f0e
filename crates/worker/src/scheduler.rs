//! Periodic enqueueing of the fleet's recurring tasks.
//!
//! Scheduled runs go through the same queue as on-demand runs, so the
//! runner is the only place tasks execute.

use robofleet_core::task::TaskName;
use robofleet_db::repositories::TaskRunRepo;
use robofleet_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;

/// Enqueue recurring tasks on their intervals until `cancel` is triggered.
pub async fn run(pool: DbPool, config: WorkerConfig, cancel: CancellationToken) {
    tracing::info!(
        fleet_health_secs = config.fleet_health_interval.as_secs(),
        scheduled_missions_secs = config.scheduled_missions_interval.as_secs(),
        "Task scheduler started"
    );

    let mut health = tokio::time::interval(config.fleet_health_interval);
    let mut missions = tokio::time::interval(config.scheduled_missions_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Task scheduler stopping");
                break;
            }
            _ = health.tick() => enqueue(&pool, TaskName::FleetHealthCheck).await,
            _ = missions.tick() => enqueue(&pool, TaskName::ProcessScheduledMissions).await,
        }
    }
}

/// Enqueue `name` unless a run of it is still queued or running.
async fn enqueue(pool: &DbPool, name: TaskName) {
    match TaskRunRepo::has_pending(pool, name).await {
        Ok(true) => {
            tracing::debug!(task = %name, "Scheduler: previous run still pending, skipping");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!(task = %name, error = %e, "Scheduler: pending check failed");
            return;
        }
    }

    match TaskRunRepo::enqueue(pool, name, None).await {
        Ok(run) => tracing::debug!(task = %name, task_id = %run.id, "Scheduler: enqueued run"),
        Err(e) => tracing::error!(task = %name, error = %e, "Scheduler: enqueue failed"),
    }
}
