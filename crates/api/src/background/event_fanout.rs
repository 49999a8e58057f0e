//! Forwards every [`FleetEvent`] on the bus to WebSocket subscribers.

use std::sync::Arc;

use robofleet_events::{FleetEvent, FleetEventKind};
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Consume the bus until it closes.
///
/// Lagging only drops the missed events; the loop keeps running.
pub async fn run(ws_manager: Arc<WsManager>, mut rx: broadcast::Receiver<FleetEvent>) {
    tracing::info!("Event fan-out started");

    loop {
        match rx.recv().await {
            Ok(event) => {
                dispatch(&ws_manager, &event).await;
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Event fan-out lagged, events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Event bus closed, fan-out stopping");
                break;
            }
        }
    }
}

/// Route one event to its topics. Returns the number of connections reached.
///
/// Robot status updates reach that robot's subscribers and the fleet
/// stream; everything else goes to the fleet stream only.
pub async fn dispatch(ws_manager: &WsManager, event: &FleetEvent) -> usize {
    let message = event.to_message();
    let delivered = match (event.event_type, event.robot_id) {
        (FleetEventKind::StatusUpdate, Some(robot_id)) => {
            ws_manager.broadcast_robot_update(robot_id, &message).await
        }
        _ => ws_manager.broadcast_fleet(&message).await,
    };
    tracing::debug!(event = event.event_type.as_str(), delivered, "Event dispatched");
    delivered
}
