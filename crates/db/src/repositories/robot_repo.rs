//! Repository for the `robots` table.

use robofleet_core::robot::{RobotStatus, RobotType};
use robofleet_core::types::DbId;
use sqlx::PgPool;

use crate::models::robot::{CreateRobot, Robot, RobotStatusUpdate, UpdateRobot};

/// Column list for `robots` queries.
const COLUMNS: &str = "\
    id, name, serial_number, robot_type, status, \
    location_x, location_y, location_z, heading, \
    firmware_version, battery_level, description, \
    created_at, updated_at";

/// Provides CRUD operations for robots.
pub struct RobotRepo;

impl RobotRepo {
    /// Insert a new robot. Missing type/status fall back to `amr`/`offline`.
    pub async fn create(pool: &PgPool, input: &CreateRobot) -> Result<Robot, sqlx::Error> {
        let query = format!(
            "INSERT INTO robots (name, serial_number, robot_type, status, \
                location_x, location_y, location_z, heading, \
                firmware_version, battery_level, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Robot>(&query)
            .bind(&input.name)
            .bind(&input.serial_number)
            .bind(input.robot_type.unwrap_or_default().as_str())
            .bind(input.status.unwrap_or_default().as_str())
            .bind(input.location_x)
            .bind(input.location_y)
            .bind(input.location_z)
            .bind(input.heading)
            .bind(&input.firmware_version)
            .bind(input.battery_level)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Robot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM robots WHERE id = $1");
        sqlx::query_as::<_, Robot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_serial(
        pool: &PgPool,
        serial_number: &str,
    ) -> Result<Option<Robot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM robots WHERE serial_number = $1");
        sqlx::query_as::<_, Robot>(&query)
            .bind(serial_number)
            .fetch_optional(pool)
            .await
    }

    /// List a page of robots, oldest first.
    pub async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Robot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM robots ORDER BY created_at ASC, id ASC OFFSET $1 LIMIT $2"
        );
        sqlx::query_as::<_, Robot>(&query)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every robot in the fleet (health checks, fleet stream snapshots).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Robot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM robots ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, Robot>(&query).fetch_all(pool).await
    }

    /// Update descriptive fields. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRobot,
    ) -> Result<Option<Robot>, sqlx::Error> {
        let query = format!(
            "UPDATE robots SET
                name = COALESCE($2, name),
                robot_type = COALESCE($3, robot_type),
                firmware_version = COALESCE($4, firmware_version),
                description = COALESCE($5, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Robot>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.robot_type.map(RobotType::as_str))
            .bind(&input.firmware_version)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Apply a status/telemetry report. Only non-`None` fields are applied.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        input: &RobotStatusUpdate,
    ) -> Result<Option<Robot>, sqlx::Error> {
        let query = format!(
            "UPDATE robots SET
                status = COALESCE($2, status),
                location_x = COALESCE($3, location_x),
                location_y = COALESCE($4, location_y),
                location_z = COALESCE($5, location_z),
                heading = COALESCE($6, heading),
                battery_level = COALESCE($7, battery_level)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Robot>(&query)
            .bind(id)
            .bind(input.status.map(RobotStatus::as_str))
            .bind(input.location_x)
            .bind(input.location_y)
            .bind(input.location_z)
            .bind(input.heading)
            .bind(input.battery_level)
            .fetch_optional(pool)
            .await
    }

    /// Delete a robot. Missions referencing it keep existing with `robot_id = NULL`.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM robots WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
