//! Task bodies, dispatched by [`TaskName`].

use robofleet_core::task::TaskName;
use robofleet_db::DbPool;
use robofleet_events::EventBus;

use crate::error::TaskError;

pub mod fleet_health;
pub mod scheduled_missions;

/// Execute one task and return the JSON stored as the run's `result`.
pub async fn execute(
    pool: &DbPool,
    bus: &EventBus,
    name: TaskName,
) -> Result<serde_json::Value, TaskError> {
    match name {
        TaskName::FleetHealthCheck => {
            let report = fleet_health::run(pool, bus).await?;
            Ok(serde_json::to_value(report)?)
        }
        TaskName::ProcessScheduledMissions => {
            let outcome = scheduled_missions::run(pool, bus, chrono::Utc::now()).await?;
            Ok(serde_json::to_value(outcome)?)
        }
    }
}
