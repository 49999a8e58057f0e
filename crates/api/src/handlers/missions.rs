//! Handlers for the `/missions` resource and its lifecycle actions.
//!
//! Lifecycle actions are planned by `robofleet_core::mission` and persisted
//! with a guard on the status they were planned from, so two concurrent
//! requests cannot both move the same mission.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use robofleet_core::error::CoreError;
use robofleet_core::mission::{self, plan_transition, LifecycleAction, Transition};
use robofleet_core::types::DbId;
use robofleet_db::models::mission::{
    CreateMission, Mission, MissionAssign, MissionListQuery, UpdateMission,
};
use robofleet_db::models::user::User;
use robofleet_db::repositories::{MissionRepo, RobotRepo};
use robofleet_events::{FleetEvent, FleetEventKind};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOperator;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Mission",
        id,
    })
}

async fn load(state: &AppState, id: DbId) -> AppResult<Mission> {
    MissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn publish_update(state: &AppState, mission: &Mission, actor: &User) {
    let mut event = FleetEvent::new(FleetEventKind::MissionUpdate)
        .with_mission(mission.id)
        .with_actor(actor.id)
        .with_payload(serde_json::json!({ "mission": mission }));
    if let Some(robot_id) = mission.robot_id {
        event = event.with_robot(robot_id);
    }
    state.event_bus.publish(event);
}

/// Persist a planned transition and announce it.
async fn apply(
    state: &AppState,
    user: &User,
    current: &Mission,
    plan: &Transition,
    robot_id: Option<DbId>,
) -> AppResult<Mission> {
    let updated =
        MissionRepo::apply_transition(&state.pool, current.id, current.status, plan, robot_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "Mission was modified by another request".into(),
                ))
            })?;

    tracing::info!(
        mission_id = %updated.id,
        from = %current.status,
        to = %updated.status,
        user_id = %user.id,
        "Mission transitioned"
    );
    publish_update(state, &updated, user);
    Ok(updated)
}

/// Shared body of start / complete / fail / cancel.
async fn run_action(
    state: &AppState,
    user: &User,
    id: DbId,
    action: LifecycleAction,
) -> AppResult<Json<Mission>> {
    let current = load(state, id).await?;
    let plan = plan_transition(
        current.status,
        action,
        current.robot_id.is_some(),
        current.started_at,
        Utc::now(),
    )?;
    let updated = apply(state, user, &current, &plan, None).await?;
    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/missions
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MissionListQuery>,
) -> AppResult<Json<Vec<Mission>>> {
    let missions = MissionRepo::list(&state.pool, &params).await?;
    Ok(Json(missions))
}

/// POST /api/v1/missions
pub async fn create(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Json(input): Json<CreateMission>,
) -> AppResult<(StatusCode, Json<Mission>)> {
    mission::validate_name(&input.name)?;

    let created = MissionRepo::create(&state.pool, &input).await?;
    tracing::info!(mission_id = %created.id, user_id = %user.id, "Mission created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/missions/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Mission>> {
    Ok(Json(load(&state, id).await?))
}

/// PATCH /api/v1/missions/{id}
///
/// Free-form update. A status change here skips the lifecycle graph but
/// still stamps `started_at` / `completed_at`.
pub async fn update(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMission>,
) -> AppResult<Json<Mission>> {
    if let Some(name) = &input.name {
        mission::validate_name(name)?;
    }
    mission::validate_progress(input.progress)?;

    let current = load(&state, id).await?;
    let effects = input
        .status
        .map(|status| mission::status_effects(status, current.started_at, Utc::now()));

    let updated = MissionRepo::update(&state.pool, id, &input, effects.as_ref())
        .await?
        .ok_or_else(|| not_found(id))?;

    if input.status.is_some_and(|s| s != current.status) {
        publish_update(&state, &updated, &user);
    }
    Ok(Json(updated))
}

/// DELETE /api/v1/missions/{id}
pub async fn delete(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if MissionRepo::delete(&state.pool, id).await? {
        tracing::info!(mission_id = %id, user_id = %user.id, "Mission deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/missions/{id}/assign
pub async fn assign(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MissionAssign>,
) -> AppResult<Json<Mission>> {
    let current = load(&state, id).await?;
    // Status is checked before the robot lookup.
    let plan = plan_transition(
        current.status,
        LifecycleAction::Assign,
        true,
        current.started_at,
        Utc::now(),
    )?;

    let robot = RobotRepo::find_by_id(&state.pool, input.robot_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Robot",
            id: input.robot_id,
        }))?;

    let updated = apply(&state, &user, &current, &plan, Some(robot.id)).await?;
    Ok(Json(updated))
}

/// POST /api/v1/missions/{id}/start
pub async fn start(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Mission>> {
    run_action(&state, &user, id, LifecycleAction::Start).await
}

/// POST /api/v1/missions/{id}/complete
pub async fn complete(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Mission>> {
    run_action(&state, &user, id, LifecycleAction::Complete).await
}

/// POST /api/v1/missions/{id}/fail
pub async fn fail(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Mission>> {
    run_action(&state, &user, id, LifecycleAction::Fail).await
}

/// POST /api/v1/missions/{id}/cancel
pub async fn cancel(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Mission>> {
    run_action(&state, &user, id, LifecycleAction::Cancel).await
}
