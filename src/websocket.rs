//! WebSocket fan-out of store updates
//!
//! Every store mutation is pushed to connected clients as a
//! `{type, data}` frame. Clients may send `{"type":"ping"}` and get a
//! `{"type":"pong"}` back; the server additionally sends protocol pings
//! on a fixed interval for keepalive.

use crate::api::ApiState;
use crate::state::StoreEvent;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// Interval between server keepalive pings
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Encode one store event as an outbound frame
fn event_frame(event: &StoreEvent) -> serde_json::Value {
    match event {
        StoreEvent::Message(message) => json!({"type": "message", "data": message}),
        StoreEvent::Trace(trace) => json!({"type": "trace", "data": trace}),
        StoreEvent::Task(task) => json!({"type": "task", "data": task}),
        StoreEvent::TaskUpdate(task) => json!({"type": "task_update", "data": task}),
        StoreEvent::RequestUpdate(request) => json!({"type": "request_update", "data": request}),
        StoreEvent::Cleared => json!({"type": "cleared", "data": {}}),
    }
}

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<ApiState>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

// Handle one WebSocket connection
async fn handle_socket(socket: WebSocket, state: ApiState) {
    let (mut sender, mut receiver) = socket.split();
    state.ws_connections.fetch_add(1, Ordering::SeqCst);
    info!("WebSocket client connected");

    // Send the current state so the client does not start from a blank panel
    let initial_state = {
        let store = state.service.store().read().await;
        json!({
            "type": "initial_state",
            "data": {
                "agents": state.agents.as_ref(),
                "messages": store.messages(),
                "traces": store.traces(),
                "tasks": store.tasks(),
                "userRequests": store.user_requests(),
                "processing": store.is_processing(),
            }
        })
    };
    if let Err(e) = sender.send(Message::Text(initial_state.to_string())).await {
        error!("Failed to send initial state: {}", e);
        state.ws_connections.fetch_sub(1, Ordering::SeqCst);
        return;
    }

    let mut events = state.service.store().read().await.subscribe_events();

    // Use a channel to serialize writes from the event loop, the ping task,
    // and pong replies onto the single sender half.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Message>();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(msg).await {
                error!("Failed to send message: {}", e);
                break;
            }
        }
    });

    let event_tx = tx.clone();
    let mut event_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let frame = event_frame(&event).to_string();
                    if event_tx.send(Message::Text(frame)).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagged; updates dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let ping_tx = tx.clone();
    let mut ping_task = tokio::spawn(async move {
        loop {
            tokio::time::sleep(PING_INTERVAL).await;
            if ping_tx.send(Message::Ping(vec![])).is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let is_ping = serde_json::from_str::<serde_json::Value>(&text)
                        .ok()
                        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
                        .is_some_and(|t| t == "ping");
                    if is_ping {
                        let pong = json!({"type": "pong"}).to_string();
                        if tx.send(Message::Text(pong)).is_err() {
                            break;
                        }
                    } else {
                        warn!("Received unhandled WebSocket message: {}", text);
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket client disconnected");
                    break;
                }
                Ok(Message::Pong(_)) => {
                    // Client responded to keepalive
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // First task to finish tears down the rest
    tokio::select! {
        _ = &mut send_task => {
            event_task.abort();
            ping_task.abort();
            recv_task.abort();
        }
        _ = &mut event_task => {
            send_task.abort();
            ping_task.abort();
            recv_task.abort();
        }
        _ = &mut ping_task => {
            send_task.abort();
            event_task.abort();
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
            event_task.abort();
            ping_task.abort();
        }
    }

    state.ws_connections.fetch_sub(1, Ordering::SeqCst);
    info!("WebSocket connection closed");
}
