//! Periodic fleet health check.

use robofleet_core::fleet_health::{self, FleetHealthReport};
use robofleet_db::repositories::RobotRepo;
use robofleet_db::DbPool;
use robofleet_events::{EventBus, FleetEvent, FleetEventKind};

use crate::error::TaskError;

/// Classify every robot and publish a `fleet_health` event with the report.
pub async fn run(pool: &DbPool, bus: &EventBus) -> Result<FleetHealthReport, TaskError> {
    let robots = RobotRepo::list_all(pool).await?;
    let snapshots: Vec<_> = robots.iter().map(|r| r.snapshot()).collect();
    let report = fleet_health::evaluate(&snapshots);

    if report.is_healthy() {
        tracing::debug!(total = report.total, "Fleet health check: all robots healthy");
    } else {
        for alert in &report.alerts {
            tracing::warn!(
                robot_id = %alert.robot_id,
                robot = %alert.name,
                kind = ?alert.kind,
                "Fleet health alert"
            );
        }
    }

    bus.publish(
        FleetEvent::new(FleetEventKind::FleetHealth)
            .with_payload(serde_json::json!({ "report": report })),
    );

    Ok(report)
}
