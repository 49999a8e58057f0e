use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ws::manager::WsManager;

const PING_EVERY: Duration = Duration::from_secs(30);

/// Ping every open stream so idle robot/fleet subscribers are not dropped by
/// proxies. Aborted on shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + PING_EVERY, PING_EVERY);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let subscriptions = ws_manager.connection_count(None).await;
            if subscriptions == 0 {
                continue;
            }
            ws_manager.ping_all().await;
            tracing::debug!(subscriptions, "Pinged WebSocket subscribers");
        }
    })
}
