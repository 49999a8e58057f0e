//! Queue runner: claims queued task runs and executes them.

use std::sync::Arc;
use std::time::Duration;

use robofleet_core::task::TASK_TIME_LIMIT_SECS;
use robofleet_db::models::task_run::TaskRun;
use robofleet_db::repositories::TaskRunRepo;
use robofleet_db::DbPool;
use robofleet_events::EventBus;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::TaskError;
use crate::tasks;

/// Poll the queue every `poll_interval` until `cancel` is triggered.
///
/// Each tick first fails runs abandoned past the time limit, then drains
/// every queued run before sleeping again. The first tick fires at startup.
pub async fn run(
    pool: DbPool,
    bus: Arc<EventBus>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        poll_interval_secs = poll_interval.as_secs(),
        "Task runner started"
    );

    let mut interval = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Task runner stopping");
                break;
            }
            _ = interval.tick() => {
                reap_abandoned(&pool).await;
                drain(&pool, &bus, &cancel).await;
            }
        }
    }
}

async fn reap_abandoned(pool: &DbPool) {
    match TaskRunRepo::fail_abandoned(pool).await {
        Ok(0) => {}
        Ok(reaped) => tracing::warn!(reaped, "Task runner: failed abandoned runs"),
        Err(e) => tracing::error!(error = %e, "Task runner: abandoned run cleanup failed"),
    }
}

async fn drain(pool: &DbPool, bus: &EventBus, cancel: &CancellationToken) {
    while !cancel.is_cancelled() {
        match TaskRunRepo::claim_next(pool).await {
            Ok(Some(run)) => process(pool, bus, run).await,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Task runner: failed to claim next run");
                break;
            }
        }
    }
}

/// Execute a claimed run and record its outcome on the row.
pub async fn process(pool: &DbPool, bus: &EventBus, run: TaskRun) {
    let span = tracing::info_span!("task_run", task_id = %run.id, task = %run.task_name);
    record(pool, bus, run).instrument(span).await
}

async fn record(pool: &DbPool, bus: &EventBus, run: TaskRun) {
    let limit = Duration::from_secs(TASK_TIME_LIMIT_SECS);
    let outcome = match tokio::time::timeout(limit, tasks::execute(pool, bus, run.task_name)).await
    {
        Ok(result) => result,
        Err(_) => Err(TaskError::TimedOut(TASK_TIME_LIMIT_SECS)),
    };

    let recorded = match outcome {
        Ok(result) => {
            tracing::info!("Task run succeeded");
            TaskRunRepo::mark_succeeded(pool, run.id, &result).await
        }
        Err(e) => {
            tracing::error!(error = %e, "Task run failed");
            TaskRunRepo::mark_failed(pool, run.id, &e.to_string()).await
        }
    };

    if let Err(e) = recorded {
        tracing::error!(error = %e, "Failed to record task run outcome");
    }
}
