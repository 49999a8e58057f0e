use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use robofleet_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// What a connection is subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Updates for a single robot.
    Robot(DbId),
    /// Fleet-wide updates: every robot status change plus mission and
    /// health events.
    Fleet,
}

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    pub user_id: DbId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Fixed by the endpoint the client connected to.
    pub topic: Topic,
    pub connected_at: Timestamp,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    /// Reverse index: topic -> subscribed connection ids. Never holds an
    /// empty set.
    subscribers: HashMap<Topic, HashSet<String>>,
}

impl Registry {
    fn remove(&mut self, conn_id: &str) -> Option<WsConnection> {
        let conn = self.connections.remove(conn_id)?;
        if let Some(ids) = self.subscribers.get_mut(&conn.topic) {
            ids.remove(conn_id);
            if ids.is_empty() {
                self.subscribers.remove(&conn.topic);
            }
        }
        Some(conn)
    }

    /// Send `message` to every connection subscribed to any of `topics`,
    /// then drop connections whose channel is closed.
    fn fan_out(&mut self, topics: &[Topic], message: &Message) -> usize {
        let targets: HashSet<String> = topics
            .iter()
            .filter_map(|t| self.subscribers.get(t))
            .flatten()
            .cloned()
            .collect();

        let mut dead = Vec::new();
        let mut delivered = 0;
        for conn_id in targets {
            let Some(conn) = self.connections.get(&conn_id) else {
                continue;
            };
            if conn.sender.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(conn_id);
            }
        }

        for conn_id in dead {
            tracing::debug!(conn_id = %conn_id, "Pruning dead WebSocket connection");
            self.remove(&conn_id);
        }
        delivered
    }
}

/// Manages all active WebSocket connections and their topic subscriptions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    registry: RwLock<Registry>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Register a new connection subscribed to `topic`.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink. Re-using an existing
    /// `conn_id` replaces that connection.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: DbId,
        topic: Topic,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            topic,
            connected_at: chrono::Utc::now(),
        };

        let mut registry = self.registry.write().await;
        registry.remove(&conn_id);
        registry
            .subscribers
            .entry(topic)
            .or_default()
            .insert(conn_id.clone());
        registry.connections.insert(conn_id, conn);
        rx
    }

    /// Remove a connection and its subscription.
    pub async fn remove(&self, conn_id: &str) {
        self.registry.write().await.remove(conn_id);
    }

    /// Queue a message for a single connection.
    ///
    /// Returns `false` if the connection is unknown or its channel is closed.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        self.registry
            .read()
            .await
            .connections
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    /// Send a robot update to that robot's subscribers and to fleet
    /// subscribers. Returns the number of connections reached.
    pub async fn broadcast_robot_update(&self, robot_id: DbId, data: &serde_json::Value) -> usize {
        let message = Message::Text(data.to_string().into());
        self.registry
            .write()
            .await
            .fan_out(&[Topic::Robot(robot_id), Topic::Fleet], &message)
    }

    /// Send a fleet-wide event to fleet subscribers. Returns the number of
    /// connections reached.
    pub async fn broadcast_fleet(&self, data: &serde_json::Value) -> usize {
        let message = Message::Text(data.to_string().into());
        self.registry
            .write()
            .await
            .fan_out(&[Topic::Fleet], &message)
    }

    /// Number of subscriptions: to one robot when `robot_id` is given,
    /// otherwise summed across every topic.
    pub async fn connection_count(&self, robot_id: Option<DbId>) -> usize {
        let registry = self.registry.read().await;
        match robot_id {
            Some(id) => registry
                .subscribers
                .get(&Topic::Robot(id))
                .map_or(0, HashSet::len),
            None => registry.subscribers.values().map(HashSet::len).sum(),
        }
    }

    /// Number of fleet-stream subscribers.
    pub async fn fleet_subscriber_count(&self) -> usize {
        self.registry
            .read()
            .await
            .subscribers
            .get(&Topic::Fleet)
            .map_or(0, HashSet::len)
    }

    /// Send a Close frame to every connection, then clear the registry.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut registry = self.registry.write().await;
        let count = registry.connections.len();
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        registry.connections.clear();
        registry.subscribers.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let registry = self.registry.read().await;
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
