//! Push channel from the external backend
//!
//! A background WebSocket client that maps inbound `{type, data}` frames
//! into store mutations. The connection is re-established on drop with
//! doubling backoff, capped at 30 seconds and a bounded attempt count.

use crate::state::{AgentTask, Message, MessageType, SharedStore, TaskStatus, Trace};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

/// Interval between outbound `{"type":"ping"}` keepalive frames
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Reconnect policy for the push channel
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// First backoff delay
    pub initial: Duration,
    /// Backoff ceiling
    pub max: Duration,
    /// Consecutive failed connection attempts before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

/// Static mapping from external agent names to the fixed internal role ids
///
/// Unmapped names pass through verbatim.
const AGENT_NAME_MAP: &[(&str, &str)] = &[
    ("chat_manager", crate::state::COORDINATOR_ID),
    ("Coordinator", crate::state::COORDINATOR_ID),
    ("Researcher", crate::state::RESEARCHER_ID),
    ("Planner", crate::state::PLANNER_ID),
    ("Executor", crate::state::EXECUTOR_ID),
    ("assistant", crate::state::EXECUTOR_ID),
    ("user_proxy", crate::state::USER_RECIPIENT),
];

fn map_agent_name(external: &str) -> String {
    AGENT_NAME_MAP
        .iter()
        .find(|(name, _)| *name == external)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| external.to_string())
}

// Inbound timestamps are Unix seconds (fractional).
fn from_unix_seconds(ts: f64) -> DateTime<Utc> {
    let secs = ts.trunc() as i64;
    let nanos = (ts.fract() * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or_else(Utc::now)
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    from: String,
    to: String,
    content: String,
    timestamp: f64,
    #[serde(rename = "type", default = "default_message_type")]
    message_type: MessageType,
}

fn default_message_type() -> MessageType {
    MessageType::Internal
}

#[derive(Debug, Deserialize)]
struct WireTrace {
    id: String,
    #[serde(rename = "agentId")]
    agent_id: String,
    action: String,
    details: String,
    timestamp: f64,
}

#[derive(Debug, Deserialize)]
struct WireTask {
    id: String,
    #[serde(rename = "assignedTo")]
    assigned_to: String,
    #[serde(default)]
    description: String,
    status: TaskStatus,
    #[serde(rename = "createdAt", default)]
    created_at: Option<f64>,
    #[serde(rename = "completedAt", default)]
    completed_at: Option<f64>,
    #[serde(default)]
    result: Option<String>,
}

/// Spawn the push-channel client as a background task
///
/// The task runs until the attempt budget is exhausted; frame handling
/// errors are logged and skipped, transport errors trigger a reconnect.
pub fn spawn_push_channel(
    url: String,
    store: SharedStore,
    reconnect: ReconnectConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff = reconnect.initial;
        let mut attempts: u32 = 0;

        loop {
            match connect_async(url.as_str()).await {
                Ok((mut stream, _)) => {
                    info!(url = %url, "push channel connected");
                    backoff = reconnect.initial;
                    attempts = 0;

                    let mut ping_timer = tokio::time::interval(PING_INTERVAL);
                    ping_timer.tick().await; // first tick is immediate

                    loop {
                        tokio::select! {
                            _ = ping_timer.tick() => {
                                let frame = WsMessage::Text(r#"{"type":"ping"}"#.to_string());
                                if let Err(e) = stream.send(frame).await {
                                    warn!(error = %e, "keepalive send failed");
                                    break;
                                }
                            }
                            incoming = stream.next() => {
                                match incoming {
                                    Some(Ok(WsMessage::Text(text))) => {
                                        apply_frame(&store, &text).await;
                                    }
                                    Some(Ok(WsMessage::Close(_))) | None => {
                                        info!("push channel closed by peer");
                                        break;
                                    }
                                    Some(Ok(_)) => {}
                                    Some(Err(e)) => {
                                        warn!(error = %e, "push channel transport error");
                                        break;
                                    }
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    attempts += 1;
                    warn!(
                        error = %e,
                        attempt = attempts,
                        max_attempts = reconnect.max_attempts,
                        "push channel connect failed"
                    );
                    if attempts >= reconnect.max_attempts {
                        error!("push channel giving up after {} attempts", attempts);
                        return;
                    }
                }
            }

            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(reconnect.max);
        }
    })
}

// Decode one inbound frame and apply it to the store. Malformed frames are
// logged and dropped rather than killing the connection.
async fn apply_frame(store: &SharedStore, text: &str) {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "undecodable push frame");
            return;
        }
    };

    match frame.kind.as_str() {
        "message" => match serde_json::from_value::<WireMessage>(frame.data) {
            Ok(wire) => {
                let message = Message {
                    id: wire.id,
                    from: map_agent_name(&wire.from),
                    to: map_agent_name(&wire.to),
                    content: wire.content,
                    timestamp: from_unix_seconds(wire.timestamp),
                    message_type: wire.message_type,
                    metadata: None,
                };
                store.write().await.add_message(message);
            }
            Err(e) => warn!(error = %e, "bad message frame"),
        },
        "trace" => match serde_json::from_value::<WireTrace>(frame.data) {
            Ok(wire) => {
                let trace = Trace {
                    id: wire.id,
                    agent_id: map_agent_name(&wire.agent_id),
                    action: wire.action,
                    details: wire.details,
                    timestamp: from_unix_seconds(wire.timestamp),
                    related_messages: None,
                };
                store.write().await.add_trace(trace);
            }
            Err(e) => warn!(error = %e, "bad trace frame"),
        },
        "task" => match serde_json::from_value::<WireTask>(frame.data) {
            Ok(wire) => {
                let task = AgentTask {
                    id: wire.id,
                    assigned_to: map_agent_name(&wire.assigned_to),
                    description: wire.description,
                    status: wire.status,
                    created_at: wire.created_at.map(from_unix_seconds).unwrap_or_else(Utc::now),
                    completed_at: wire.completed_at.map(from_unix_seconds),
                    result: wire.result,
                    parent_id: None,
                };
                store.write().await.add_task(task);
            }
            Err(e) => warn!(error = %e, "bad task frame"),
        },
        "task_update" => match serde_json::from_value::<WireTask>(frame.data) {
            Ok(wire) => {
                let updated = store
                    .write()
                    .await
                    .update_task(&wire.id, wire.status, wire.result);
                if updated.is_none() {
                    debug!(task_id = %wire.id, "task_update for unknown task");
                }
            }
            Err(e) => warn!(error = %e, "bad task_update frame"),
        },
        "pong" => {}
        other => debug!(kind = other, "ignoring unknown push frame type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{shared_store, COORDINATOR_ID, RESEARCHER_ID};

    #[test]
    fn test_map_agent_name() {
        assert_eq!(map_agent_name("Researcher"), RESEARCHER_ID);
        assert_eq!(map_agent_name("chat_manager"), COORDINATOR_ID);
        // Unmapped names pass through verbatim
        assert_eq!(map_agent_name("critic_agent"), "critic_agent");
    }

    #[test]
    fn test_from_unix_seconds() {
        let ts = from_unix_seconds(1_700_000_000.5);
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }

    #[tokio::test]
    async fn test_apply_message_frame_maps_names() {
        let store = shared_store();
        let frame = r#"{
            "type": "message",
            "data": {
                "id": "m1",
                "from": "Researcher",
                "to": "chat_manager",
                "content": "findings",
                "timestamp": 1700000000.0,
                "type": "internal"
            }
        }"#;
        apply_frame(&store, frame).await;

        let messages = store.read().await.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, RESEARCHER_ID);
        assert_eq!(messages[0].to, COORDINATOR_ID);
        assert_eq!(messages[0].timestamp.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_apply_task_then_update() {
        let store = shared_store();
        apply_frame(
            &store,
            r#"{"type":"task","data":{
                "id":"t1","assignedTo":"Planner","description":"plan",
                "status":"pending","createdAt":1700000000.0}}"#,
        )
        .await;
        apply_frame(
            &store,
            r#"{"type":"task_update","data":{
                "id":"t1","assignedTo":"Planner",
                "status":"completed","result":"done"}}"#,
        )
        .await;

        let tasks = store.read().await.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Completed);
        assert_eq!(tasks[0].result.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        let store = shared_store();
        apply_frame(&store, "not json").await;
        apply_frame(&store, r#"{"type":"message","data":{"id":"only"}}"#).await;
        apply_frame(&store, r#"{"type":"pong"}"#).await;
        apply_frame(&store, r#"{"type":"mystery","data":{}}"#).await;

        let store = store.read().await;
        assert!(store.messages().is_empty());
        assert!(store.traces().is_empty());
        assert!(store.tasks().is_empty());
    }
}
