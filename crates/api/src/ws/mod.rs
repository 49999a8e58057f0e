//! WebSocket infrastructure for live robot and fleet streams.
//!
//! Provides topic-based connection management, heartbeat pings, and the
//! HTTP upgrade handlers mounted at `/ws/robots/{robot_id}` and `/ws/fleet`.

mod handler;
mod heartbeat;
pub mod manager;
pub mod messages;

pub use handler::{fleet_stream, robot_stream, WsAuth, CLOSE_ROBOT_NOT_FOUND};
pub use heartbeat::start_heartbeat;
pub use manager::{Topic, WsManager};
