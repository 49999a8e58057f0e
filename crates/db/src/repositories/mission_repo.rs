//! Repository for the `missions` table.
//!
//! Status changes go through [`MissionRepo::apply_transition`], which only
//! succeeds while the row is still in the status the caller planned from.

use robofleet_core::mission::{MissionPriority, MissionStatus, Transition};
use robofleet_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::mission::{CreateMission, Mission, MissionListQuery, UpdateMission};
use crate::{clamp_limit, clamp_offset};

/// Column list for `missions` queries.
const COLUMNS: &str = "\
    id, name, description, status, priority, \
    target_x, target_y, target_z, \
    scheduled_at, started_at, completed_at, progress, robot_id, \
    created_at, updated_at";

/// Provides CRUD and lifecycle operations for missions.
pub struct MissionRepo;

impl MissionRepo {
    /// Insert a new `pending` mission.
    pub async fn create(pool: &PgPool, input: &CreateMission) -> Result<Mission, sqlx::Error> {
        let query = format!(
            "INSERT INTO missions (name, description, priority, target_x, target_y, target_z, scheduled_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mission>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.priority.unwrap_or_default().as_str())
            .bind(input.target_x)
            .bind(input.target_y)
            .bind(input.target_z)
            .bind(input.scheduled_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Mission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM missions WHERE id = $1");
        sqlx::query_as::<_, Mission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List missions with optional status / robot filters, oldest first.
    pub async fn list(pool: &PgPool, params: &MissionListQuery) -> Result<Vec<Mission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM missions
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR robot_id = $2)
             ORDER BY created_at ASC, id ASC
             OFFSET $3 LIMIT $4"
        );
        sqlx::query_as::<_, Mission>(&query)
            .bind(params.status.map(MissionStatus::as_str))
            .bind(params.robot_id)
            .bind(clamp_offset(params.skip))
            .bind(clamp_limit(params.limit))
            .fetch_all(pool)
            .await
    }

    /// Generic update. `effects` carries the timestamp side effects of a
    /// status change (see `robofleet_core::mission::status_effects`).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMission,
        effects: Option<&Transition>,
    ) -> Result<Option<Mission>, sqlx::Error> {
        let query = format!(
            "UPDATE missions SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                target_x = COALESCE($6, target_x),
                target_y = COALESCE($7, target_y),
                target_z = COALESCE($8, target_z),
                scheduled_at = COALESCE($9, scheduled_at),
                progress = COALESCE($10, progress),
                started_at = COALESCE($11, started_at),
                completed_at = COALESCE($12, completed_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mission>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.map(MissionStatus::as_str))
            .bind(input.priority.map(MissionPriority::as_str))
            .bind(input.target_x)
            .bind(input.target_y)
            .bind(input.target_z)
            .bind(input.scheduled_at)
            .bind(input.progress)
            .bind(effects.and_then(|e| e.started_at))
            .bind(effects.and_then(|e| e.completed_at))
            .fetch_optional(pool)
            .await
    }

    /// Persist a planned lifecycle transition.
    ///
    /// The update only applies while the row is still in `expected`; `None`
    /// means the mission is gone or another request moved it first.
    pub async fn apply_transition(
        pool: &PgPool,
        id: DbId,
        expected: MissionStatus,
        transition: &Transition,
        robot_id: Option<DbId>,
    ) -> Result<Option<Mission>, sqlx::Error> {
        let query = format!(
            "UPDATE missions SET
                status = $3,
                started_at = COALESCE($4, started_at),
                completed_at = COALESCE($5, completed_at),
                progress = COALESCE($6, progress),
                robot_id = COALESCE($7, robot_id)
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mission>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(transition.status.as_str())
            .bind(transition.started_at)
            .bind(transition.completed_at)
            .bind(transition.progress)
            .bind(robot_id)
            .fetch_optional(pool)
            .await
    }

    /// Assigned missions with a robot whose `scheduled_at` has passed.
    pub async fn list_due(pool: &PgPool, now: Timestamp) -> Result<Vec<Mission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM missions
             WHERE status = $1 AND robot_id IS NOT NULL
               AND scheduled_at IS NOT NULL AND scheduled_at <= $2
             ORDER BY scheduled_at ASC"
        );
        sqlx::query_as::<_, Mission>(&query)
            .bind(MissionStatus::Assigned.as_str())
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM missions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
