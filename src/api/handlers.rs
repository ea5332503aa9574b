//! HTTP request handlers
//!
//! The route set mirrors what the dashboard consumes: status, the agent
//! roster, request submission/lookup, a full state snapshot, and the
//! dashboard reset.

use crate::api::ApiState;
use crate::config::BackendKind;
use crate::error::AppError;
use crate::state::{Agent, AgentTask, Message, Trace, UserRequest};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use tracing::info;

/// Root banner response
#[derive(Serialize)]
pub struct BannerResponse {
    /// Human-readable banner
    pub message: String,
    /// Status indicator
    pub status: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health indicator
    pub status: String,
    /// Crate version
    pub version: String,
}

/// `GET /status` response
#[derive(Serialize)]
pub struct StatusResponse {
    /// Overall status indicator
    pub status: String,
    /// Selected processing backend ("native" or "autogen")
    pub backend: String,
    /// Whether a request is currently in flight
    pub processing: bool,
    /// Number of connected WebSocket clients
    pub active_connections: usize,
}

/// Agent roster response
#[derive(Serialize)]
pub struct AgentsResponse {
    /// The fixed four-agent roster
    pub agents: Vec<Agent>,
    /// Roster size
    pub count: usize,
}

/// Request submission body
#[derive(Deserialize)]
pub struct SubmitRequest {
    /// Free-text user request
    pub content: String,
}

/// Request submission response
#[derive(Serialize)]
pub struct SubmitResponse {
    /// Id of the accepted request
    pub request_id: String,
    /// Always "processing"; poll or listen on the WebSocket for progress
    pub status: String,
}

/// Full state snapshot
#[derive(Serialize)]
pub struct SnapshotResponse {
    /// All messages, in emission order
    pub messages: Vec<Message>,
    /// All trace entries, in emission order
    pub traces: Vec<Trace>,
    /// All tasks, in creation order
    pub tasks: Vec<AgentTask>,
    /// All user requests, in submission order
    #[serde(rename = "userRequests")]
    pub user_requests: Vec<UserRequest>,
    /// Whether a request is currently in flight
    pub processing: bool,
}

/// GET / - banner
pub async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Agent Collaboration Backend API".to_string(),
        status: "ok".to_string(),
    })
}

/// GET /api/health - health check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /status - runtime status
pub async fn status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let processing = state.service.store().read().await.is_processing();
    Json(StatusResponse {
        status: "running".to_string(),
        backend: match state.backend {
            BackendKind::Native => "native".to_string(),
            BackendKind::Autogen => "autogen".to_string(),
        },
        processing,
        active_connections: state.ws_connections.load(Ordering::SeqCst),
    })
}

/// GET /api/agents - the static roster
pub async fn list_agents(State(state): State<ApiState>) -> Json<AgentsResponse> {
    Json(AgentsResponse {
        count: state.agents.len(),
        agents: state.agents.as_ref().clone(),
    })
}

/// POST /api/request - submit a user request
///
/// Accepts the request (or rejects it with 409 while another is in
/// flight) and runs the conversation in a spawned task; progress streams
/// over the WebSocket.
pub async fn submit_request(
    State(state): State<ApiState>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let request = state.service.begin(&body.content).await?;
    let request_id = request.id.clone();

    let service = state.service.clone();
    tokio::spawn(async move {
        // Terminal status is recorded in the store; nothing to do here.
        let _ = service.process(&request).await;
    });

    Ok(Json(SubmitResponse {
        request_id,
        status: "processing".to_string(),
    }))
}

/// GET /api/requests/:id - look up one user request
pub async fn get_request(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<UserRequest>, AppError> {
    let request = state.service.store().read().await.user_request(&id);
    request.map(Json).ok_or(AppError::RequestNotFound(id))
}

/// GET /api/snapshot - all four collections at once
pub async fn snapshot(State(state): State<ApiState>) -> Json<SnapshotResponse> {
    let store = state.service.store().read().await;
    Json(SnapshotResponse {
        messages: store.messages(),
        traces: store.traces(),
        tasks: store.tasks(),
        user_requests: store.user_requests(),
        processing: store.is_processing(),
    })
}

/// POST /api/clear - reset the dashboard
///
/// Rejected while a request is in flight; clearing under a running
/// conversation would let it keep appending to a "fresh" store.
pub async fn clear(State(state): State<ApiState>) -> Result<Json<BannerResponse>, AppError> {
    let mut store = state.service.store().write().await;
    if store.is_processing() {
        return Err(AppError::AlreadyProcessing);
    }
    store.clear_data();
    info!("store cleared");
    Ok(Json(BannerResponse {
        message: "cleared".to_string(),
        status: "ok".to_string(),
    }))
}
