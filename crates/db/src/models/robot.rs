//! Robot entity model and DTOs.

use robofleet_core::fleet_health::RobotSnapshot;
use robofleet_core::robot::{RobotStatus, RobotType};
use robofleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `robots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Robot {
    pub id: DbId,
    pub name: String,
    pub serial_number: String,
    #[sqlx(try_from = "String")]
    pub robot_type: RobotType,
    #[sqlx(try_from = "String")]
    pub status: RobotStatus,
    pub location_x: Option<f64>,
    pub location_y: Option<f64>,
    pub location_z: Option<f64>,
    /// Degrees.
    pub heading: Option<f64>,
    pub firmware_version: Option<String>,
    /// Percentage, 0-100.
    pub battery_level: Option<f64>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Robot {
    /// The subset of fields used by health checks and fleet snapshots.
    pub fn snapshot(&self) -> RobotSnapshot {
        RobotSnapshot {
            id: self.id,
            name: self.name.clone(),
            status: self.status,
            battery_level: self.battery_level,
        }
    }
}

/// DTO for registering a robot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRobot {
    pub name: String,
    pub serial_number: String,
    pub robot_type: Option<RobotType>,
    pub status: Option<RobotStatus>,
    pub location_x: Option<f64>,
    pub location_y: Option<f64>,
    pub location_z: Option<f64>,
    pub heading: Option<f64>,
    pub firmware_version: Option<String>,
    pub battery_level: Option<f64>,
    pub description: Option<String>,
}

/// DTO for updating descriptive robot fields. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRobot {
    pub name: Option<String>,
    pub robot_type: Option<RobotType>,
    pub firmware_version: Option<String>,
    pub description: Option<String>,
}

/// DTO for a status/telemetry report. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RobotStatusUpdate {
    pub status: Option<RobotStatus>,
    pub location_x: Option<f64>,
    pub location_y: Option<f64>,
    pub location_z: Option<f64>,
    pub heading: Option<f64>,
    pub battery_level: Option<f64>,
}
