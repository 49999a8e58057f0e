//! Handlers for the `/robots` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use robofleet_core::error::CoreError;
use robofleet_core::robot;
use robofleet_core::types::DbId;
use robofleet_db::models::robot::{CreateRobot, Robot, RobotStatusUpdate, UpdateRobot};
use robofleet_db::repositories::RobotRepo;
use robofleet_db::{clamp_limit, clamp_offset};
use robofleet_events::{FleetEvent, FleetEventKind};

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOperator;
use crate::query::PaginationParams;
use crate::state::AppState;
use crate::ws::messages;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Robot", id })
}

fn serial_taken() -> AppError {
    AppError::BadRequest("Serial number already registered".into())
}

/// GET /api/v1/robots
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Vec<Robot>>> {
    let robots = RobotRepo::list(
        &state.pool,
        clamp_offset(params.skip),
        clamp_limit(params.limit),
    )
    .await?;
    Ok(Json(robots))
}

/// POST /api/v1/robots
pub async fn create(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Json(input): Json<CreateRobot>,
) -> AppResult<(StatusCode, Json<Robot>)> {
    robot::validate_name(&input.name)?;
    robot::validate_serial_number(&input.serial_number)?;
    robot::validate_firmware_version(input.firmware_version.as_deref())?;
    robot::validate_battery_level(input.battery_level)?;
    robot::validate_heading(input.heading)?;
    robot::validate_coordinates(&[input.location_x, input.location_y, input.location_z])?;

    if RobotRepo::find_by_serial(&state.pool, &input.serial_number)
        .await?
        .is_some()
    {
        return Err(serial_taken());
    }

    let created = RobotRepo::create(&state.pool, &input).await.map_err(|e| {
        if is_unique_violation(&e, "uq_robots_serial_number") {
            serial_taken()
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(robot_id = %created.id, user_id = %user.id, "Robot registered");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/robots/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Robot>> {
    let robot = RobotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(robot))
}

/// PATCH /api/v1/robots/{id}
pub async fn update(
    _user: RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRobot>,
) -> AppResult<Json<Robot>> {
    if let Some(name) = &input.name {
        robot::validate_name(name)?;
    }
    robot::validate_firmware_version(input.firmware_version.as_deref())?;

    let robot = RobotRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(robot))
}

/// PATCH /api/v1/robots/{id}/status
///
/// Applies a status/telemetry report and pushes a `status_update` to the
/// robot's subscribers and the fleet stream.
pub async fn update_status(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RobotStatusUpdate>,
) -> AppResult<Json<Robot>> {
    robot::validate_battery_level(input.battery_level)?;
    robot::validate_heading(input.heading)?;
    robot::validate_coordinates(&[input.location_x, input.location_y, input.location_z])?;

    let robot = RobotRepo::update_status(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::debug!(robot_id = %id, status = %robot.status, "Robot status updated");
    state.event_bus.publish(
        FleetEvent::new(FleetEventKind::StatusUpdate)
            .with_robot(robot.id)
            .with_actor(user.id)
            .with_payload(serde_json::json!({ "robot": messages::robot_state(&robot) })),
    );

    Ok(Json(robot))
}

/// DELETE /api/v1/robots/{id}
pub async fn delete(
    RequireOperator(user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if RobotRepo::delete(&state.pool, id).await? {
        tracing::info!(robot_id = %id, user_id = %user.id, "Robot deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
