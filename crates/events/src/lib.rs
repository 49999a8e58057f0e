//! RoboFleet in-process event bus.
//!
//! - [`EventBus`] -- publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`FleetEvent`] -- the event envelope carried on the bus.
//! - [`FleetEventKind`] -- the kinds of event the fleet emits.
//!
//! Handlers and background tasks publish; the API forwards every event to
//! its WebSocket subscribers.

pub mod bus;

pub use bus::{EventBus, FleetEvent, FleetEventKind};
