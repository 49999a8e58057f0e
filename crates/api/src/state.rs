use std::sync::Arc;

use robofleet_events::EventBus;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: robofleet_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager for the robot and fleet streams.
    pub ws_manager: Arc<WsManager>,
    /// Event bus handlers publish robot and mission changes on.
    pub event_bus: Arc<EventBus>,
}
