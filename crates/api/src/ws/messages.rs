//! JSON shapes sent over the robot and fleet streams.

use robofleet_db::models::robot::Robot;
use serde_json::{json, Value};

/// Robot state as carried by `connected` and `status_update` messages.
pub fn robot_state(robot: &Robot) -> Value {
    json!({
        "id": robot.id,
        "name": robot.name,
        "serial_number": robot.serial_number,
        "status": robot.status,
        "location_x": robot.location_x,
        "location_y": robot.location_y,
        "location_z": robot.location_z,
        "heading": robot.heading,
        "battery_level": robot.battery_level,
    })
}

/// First message on a robot stream.
pub fn robot_connected(robot: &Robot, subscribers: usize) -> Value {
    json!({
        "event": "connected",
        "robot_id": robot.id,
        "robot": robot_state(robot),
        "subscribers": subscribers,
    })
}

/// First message on the fleet stream.
pub fn fleet_connected(robots: &[Robot]) -> Value {
    let snapshots: Vec<_> = robots.iter().map(Robot::snapshot).collect();
    json!({
        "event": "connected",
        "fleet_size": robots.len(),
        "robots": snapshots,
    })
}

pub fn pong() -> Value {
    json!({ "type": "pong" })
}

/// Whether an inbound text frame is a `{"type": "ping"}` keep-alive.
pub fn is_ping(text: &str) -> bool {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(Value::as_str).map(|t| t == "ping"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_detection() {
        assert!(is_ping(r#"{"type":"ping"}"#));
        assert!(!is_ping(r#"{"type":"subscribe"}"#));
        assert!(!is_ping("ping"));
        assert!(!is_ping("{}"));
    }

    #[test]
    fn pong_shape() {
        assert_eq!(pong()["type"], "pong");
    }
}
