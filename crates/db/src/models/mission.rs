//! Mission entity model and DTOs.

use robofleet_core::mission::{MissionPriority, MissionStatus};
use robofleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `missions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: MissionStatus,
    #[sqlx(try_from = "String")]
    pub priority: MissionPriority,
    pub target_x: Option<f64>,
    pub target_y: Option<f64>,
    pub target_z: Option<f64>,
    pub scheduled_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    /// Percentage, 0-100.
    pub progress: f64,
    pub robot_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a mission. New missions are always `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMission {
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<MissionPriority>,
    pub target_x: Option<f64>,
    pub target_y: Option<f64>,
    pub target_z: Option<f64>,
    pub scheduled_at: Option<Timestamp>,
}

/// DTO for the generic mission update. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<MissionStatus>,
    pub priority: Option<MissionPriority>,
    pub target_x: Option<f64>,
    pub target_y: Option<f64>,
    pub target_z: Option<f64>,
    pub scheduled_at: Option<Timestamp>,
    pub progress: Option<f64>,
}

/// Body of `POST /missions/{id}/assign`.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionAssign {
    pub robot_id: DbId,
}

/// Query parameters for `GET /missions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionListQuery {
    pub status: Option<MissionStatus>,
    pub robot_id: Option<DbId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
