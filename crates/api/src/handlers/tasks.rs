//! Handlers for the `/tasks` resource: on-demand background task runs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use robofleet_core::error::CoreError;
use robofleet_core::task::{TaskName, TaskStatus};
use robofleet_core::types::DbId;
use robofleet_db::models::task_run::TaskRun;
use robofleet_db::repositories::TaskRunRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOperator;
use crate::state::AppState;

/// Acknowledgment returned when a run is queued.
#[derive(Debug, Serialize)]
pub struct TaskQueued {
    pub task_id: DbId,
    pub task_name: TaskName,
    pub status: TaskStatus,
}

async fn enqueue(
    state: &AppState,
    name: TaskName,
    requested_by: DbId,
) -> AppResult<(StatusCode, Json<TaskQueued>)> {
    let run = TaskRunRepo::enqueue(&state.pool, name, Some(requested_by)).await?;
    tracing::info!(task_id = %run.id, task = %name, user_id = %requested_by, "Task queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(TaskQueued {
            task_id: run.id,
            task_name: run.task_name,
            status: run.status,
        }),
    ))
}

/// POST /api/v1/tasks/fleet-health-check
pub async fn fleet_health_check(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<TaskQueued>)> {
    enqueue(&state, TaskName::FleetHealthCheck, user.id).await
}

/// POST /api/v1/tasks/process-scheduled-missions
pub async fn process_scheduled_missions(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<TaskQueued>)> {
    enqueue(&state, TaskName::ProcessScheduledMissions, user.id).await
}

/// GET /api/v1/tasks/{task_id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<Json<TaskRun>> {
    let run = TaskRunRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;
    Ok(Json(run))
}
