use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use robofleet_core::error::CoreError;
use robofleet_core::types::DbId;
use robofleet_db::models::user::User;
use robofleet_db::repositories::RobotRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::authenticate;
use crate::state::AppState;
use crate::ws::manager::{Topic, WsManager};
use crate::ws::messages;

/// Close code sent when the requested robot does not exist.
pub const CLOSE_ROBOT_NOT_FOUND: u16 = 4004;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// User authenticated through the `?token=` query parameter.
///
/// Browsers cannot set headers on a WebSocket handshake, so the streams take
/// the access token from the query string. Declared before
/// `WebSocketUpgrade` so a bad token is rejected with 401 instead of being
/// upgraded.
pub struct WsAuth(pub User);

impl FromRequestParts<AppState> for WsAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<TokenQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let token = query.token.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Could not validate credentials".into()))
        })?;
        authenticate(state, &token).await.map(WsAuth)
    }
}

/// GET /ws/robots/{robot_id}?token=
///
/// Live updates for one robot. An unknown robot is upgraded and then closed
/// with code 4004.
pub async fn robot_stream(
    State(state): State<AppState>,
    Path(robot_id): Path<DbId>,
    WsAuth(user): WsAuth,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let robot = RobotRepo::find_by_id(&state.pool, robot_id).await?;

    let Some(robot) = robot else {
        tracing::debug!(robot_id = %robot_id, "WebSocket requested for unknown robot");
        return Ok(ws.on_upgrade(reject_unknown_robot).into_response());
    };

    Ok(ws
        .on_upgrade(move |socket| async move {
            let manager = Arc::clone(&state.ws_manager);
            let conn_id = uuid::Uuid::new_v4().to_string();
            let rx = manager
                .add(conn_id.clone(), user.id, Topic::Robot(robot.id))
                .await;
            let subscribers = manager.connection_count(Some(robot.id)).await;
            let greeting = messages::robot_connected(&robot, subscribers);
            handle_socket(socket, manager, conn_id, rx, greeting).await;
        })
        .into_response())
}

/// GET /ws/fleet?token=
///
/// Live updates for every robot plus mission and health events.
pub async fn fleet_stream(
    State(state): State<AppState>,
    WsAuth(user): WsAuth,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let robots = RobotRepo::list_all(&state.pool).await?;
    let greeting = messages::fleet_connected(&robots);

    Ok(ws
        .on_upgrade(move |socket| async move {
            let manager = Arc::clone(&state.ws_manager);
            let conn_id = uuid::Uuid::new_v4().to_string();
            let rx = manager.add(conn_id.clone(), user.id, Topic::Fleet).await;
            handle_socket(socket, manager, conn_id, rx, greeting).await;
        })
        .into_response())
}

async fn reject_unknown_robot(mut socket: WebSocket) {
    let frame = CloseFrame {
        code: CLOSE_ROBOT_NOT_FOUND,
        reason: "Robot not found".into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "Failed to send close frame");
    }
}

/// Manage a single registered WebSocket connection.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Queues the greeting so it is the first frame the client sees.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Answers `{"type":"ping"}` with `{"type":"pong"}` on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(
    socket: WebSocket,
    ws_manager: Arc<WsManager>,
    conn_id: String,
    mut rx: tokio::sync::mpsc::UnboundedReceiver<Message>,
    greeting: serde_json::Value,
) {
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    ws_manager
        .send_to(&conn_id, Message::Text(greeting.to_string().into()))
        .await;

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => {
                if messages::is_ping(text.as_str()) {
                    let pong = messages::pong().to_string();
                    ws_manager.send_to(&conn_id, Message::Text(pong.into())).await;
                }
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
