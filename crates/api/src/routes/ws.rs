//! WebSocket stream routes, mounted at the root (not under `/api/v1`).

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// ```text
/// GET /ws/robots/{robot_id}?token=   one robot
/// GET /ws/fleet?token=               whole fleet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws/robots/{robot_id}", get(ws::robot_stream))
        .route("/ws/fleet", get(ws::fleet_stream))
}
