//! Fleet health classification used by the `fleet_health_check` task.
//!
//! Pure functions over robot snapshots; the worker loads the snapshots and
//! persists the resulting [`FleetHealthReport`] as the task result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::robot::RobotStatus;
use crate::types::DbId;

/// Battery percentage below which a robot raises a `low_battery` alert.
pub const LOW_BATTERY_THRESHOLD: f64 = 20.0;

/// The fields of a robot the health check looks at. Also the per-robot
/// entry of the fleet stream's initial snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RobotSnapshot {
    pub id: DbId,
    pub name: String,
    pub status: RobotStatus,
    pub battery_level: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowBattery,
    Fault,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAlert {
    pub robot_id: DbId,
    pub name: String,
    pub kind: AlertKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetHealthReport {
    pub total: usize,
    /// Count of robots per status. Every status is present, zero or not.
    pub by_status: BTreeMap<String, usize>,
    pub alerts: Vec<HealthAlert>,
}

impl FleetHealthReport {
    pub fn is_healthy(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Alerts raised by a single robot. A robot can raise more than one.
pub fn classify(robot: &RobotSnapshot) -> Vec<AlertKind> {
    let mut kinds = Vec::new();
    match robot.status {
        RobotStatus::Error => kinds.push(AlertKind::Fault),
        RobotStatus::Offline => kinds.push(AlertKind::Offline),
        _ => {}
    }
    // Charging robots are already addressing their battery.
    if robot.status != RobotStatus::Charging {
        if let Some(level) = robot.battery_level {
            if level < LOW_BATTERY_THRESHOLD {
                kinds.push(AlertKind::LowBattery);
            }
        }
    }
    kinds
}

/// Build a fleet-wide report from every robot snapshot.
pub fn evaluate(robots: &[RobotSnapshot]) -> FleetHealthReport {
    let mut by_status: BTreeMap<String, usize> = RobotStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();

    let mut alerts = Vec::new();
    for robot in robots {
        *by_status.entry(robot.status.as_str().to_string()).or_default() += 1;
        alerts.extend(classify(robot).into_iter().map(|kind| HealthAlert {
            robot_id: robot.id,
            name: robot.name.clone(),
            kind,
        }));
    }

    FleetHealthReport {
        total: robots.len(),
        by_status,
        alerts,
    }
}
