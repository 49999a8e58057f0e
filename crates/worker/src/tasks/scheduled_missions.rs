//! Starts assigned missions whose scheduled time has arrived.

use robofleet_core::mission::{plan_transition, LifecycleAction, MissionStatus};
use robofleet_core::types::{DbId, Timestamp};
use robofleet_db::repositories::MissionRepo;
use robofleet_db::DbPool;
use robofleet_events::{EventBus, FleetEvent, FleetEventKind};
use serde::Serialize;

use crate::error::TaskError;

/// Result of one `process_scheduled_missions` run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduledMissionsOutcome {
    pub started: usize,
    pub mission_ids: Vec<DbId>,
}

/// Start every due mission using the same rules as the start endpoint.
///
/// A mission that another request moved in the meantime is skipped.
pub async fn run(
    pool: &DbPool,
    bus: &EventBus,
    now: Timestamp,
) -> Result<ScheduledMissionsOutcome, TaskError> {
    let due = MissionRepo::list_due(pool, now).await?;
    let mut outcome = ScheduledMissionsOutcome::default();

    for mission in due {
        let plan = match plan_transition(
            mission.status,
            LifecycleAction::Start,
            mission.robot_id.is_some(),
            mission.started_at,
            now,
        ) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(mission_id = %mission.id, error = %e, "Skipping scheduled mission");
                continue;
            }
        };

        let Some(started) =
            MissionRepo::apply_transition(pool, mission.id, MissionStatus::Assigned, &plan, None)
                .await?
        else {
            tracing::debug!(mission_id = %mission.id, "Scheduled mission already moved on");
            continue;
        };

        tracing::info!(
            mission_id = %started.id,
            robot_id = ?started.robot_id,
            "Started scheduled mission"
        );

        let mut event = FleetEvent::new(FleetEventKind::MissionUpdate)
            .with_mission(started.id)
            .with_payload(serde_json::json!({ "mission": started }));
        if let Some(robot_id) = started.robot_id {
            event = event.with_robot(robot_id);
        }
        bus.publish(event);

        outcome.mission_ids.push(started.id);
    }

    outcome.started = outcome.mission_ids.len();
    Ok(outcome)
}
