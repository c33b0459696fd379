//! WebSocket and HTTP API handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use idobata_shared::protocol::{ClientEvent, SessionId, User};

use super::state::AppState;

/// Upgrade a connection and hand it to the session loop.
///
/// There is nothing to negotiate: the coordinator allocates the session
/// identifier itself, so every upgrade is accepted.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    // Register the connection; the welcome and first snapshot are queued on
    // the session channel before the lock is released
    let (session_id, rx) = {
        let mut coordinator = state.coordinator.lock().await;
        coordinator.on_connect()
    };
    tracing::info!("Session '{}' connected and registered", session_id);

    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = tokio::spawn(read_loop(receiver, state.clone(), session_id.clone()));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    {
        let mut coordinator = state.coordinator.lock().await;
        coordinator.on_disconnect(&session_id);
    }
    tracing::info!("Session '{}' disconnected and removed from registry", session_id);
}

/// Spawns a task that drains the session channel into the WebSocket sink.
///
/// Everything the coordinator queued for this session flows through here, in
/// queue order.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Receive frames from one client and apply them to the coordinator.
///
/// Malformed frames are logged and skipped; the connection stays open.
async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    session_id: SessionId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match ClientEvent::decode(&text) {
                Ok(ClientEvent::ProfileUpdate { name, avatar, .. }) => {
                    let mut coordinator = state.coordinator.lock().await;
                    coordinator.on_profile_update(&session_id, name, avatar);
                }
                Ok(ClientEvent::SendMessage { text, ts, .. }) => {
                    let mut coordinator = state.coordinator.lock().await;
                    coordinator.on_message(&session_id, text, ts);
                }
                Err(e) => {
                    tracing::warn!("Malformed frame from session '{}': {}", session_id, e);
                }
            },
            Message::Ping(_) => {
                tracing::debug!("Received ping from session '{}'", session_id);
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Session '{}' requested close", session_id);
                break;
            }
            _ => {}
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current presence roster, in arrival order
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    let coordinator = state.coordinator.lock().await;
    Json(coordinator.snapshot())
}
