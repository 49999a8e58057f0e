//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`FleetEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use robofleet_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// FleetEventKind
// ---------------------------------------------------------------------------

/// What happened. Serialized as the `event` field of WebSocket messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetEventKind {
    /// A robot reported a new status or telemetry.
    StatusUpdate,
    /// A mission moved through its lifecycle.
    MissionUpdate,
    /// A fleet health check finished.
    FleetHealth,
}

impl FleetEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatusUpdate => "status_update",
            Self::MissionUpdate => "mission_update",
            Self::FleetHealth => "fleet_health",
        }
    }
}

// ---------------------------------------------------------------------------
// FleetEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in the fleet.
///
/// Constructed via [`FleetEvent::new`] and enriched with the builder
/// methods [`with_robot`](FleetEvent::with_robot),
/// [`with_mission`](FleetEvent::with_mission),
/// [`with_actor`](FleetEvent::with_actor), and
/// [`with_payload`](FleetEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetEvent {
    pub event_type: FleetEventKind,

    /// Robot the event concerns. Robot-scoped WebSocket subscribers only
    /// see events that carry their robot's id.
    pub robot_id: Option<DbId>,

    pub mission_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl FleetEvent {
    /// Create a new event of the given kind with an empty payload.
    pub fn new(event_type: FleetEventKind) -> Self {
        Self {
            event_type,
            robot_id: None,
            mission_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_robot(mut self, robot_id: DbId) -> Self {
        self.robot_id = Some(robot_id);
        self
    }

    pub fn with_mission(mut self, mission_id: DbId) -> Self {
        self.mission_id = Some(mission_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Flatten the event into the JSON message sent to WebSocket clients.
    ///
    /// Object payload fields are lifted to the top level next to `event`,
    /// `robot_id`, `mission_id` and `timestamp`; any other payload is
    /// nested under `data`.
    pub fn to_message(&self) -> serde_json::Value {
        let mut message = serde_json::Map::new();
        message.insert("event".into(), self.event_type.as_str().into());
        if let Some(robot_id) = self.robot_id {
            message.insert("robot_id".into(), robot_id.to_string().into());
        }
        if let Some(mission_id) = self.mission_id {
            message.insert("mission_id".into(), mission_id.to_string().into());
        }
        message.insert("timestamp".into(), self.timestamp.to_rfc3339().into());

        match &self.payload {
            serde_json::Value::Object(fields) => {
                for (key, value) in fields {
                    message.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            serde_json::Value::Null => {}
            other => {
                message.insert("data".into(), other.clone());
            }
        }
        serde_json::Value::Object(message)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`FleetEvent`].
///
/// # Usage
///
/// ```rust
/// use robofleet_events::{EventBus, FleetEvent, FleetEventKind};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(FleetEvent::new(FleetEventKind::FleetHealth));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<FleetEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: FleetEvent) {
        // SendError only means there are zero receivers.
        if self.sender.send(event).is_err() {
            tracing::trace!("Event published with no subscribers");
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<FleetEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
