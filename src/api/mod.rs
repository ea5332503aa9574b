//! API module
//!
//! Contains HTTP request handlers and the shared handler state.

pub mod handlers;

use crate::config::BackendKind;
use crate::service::CollabService;
use crate::state::Agent;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// State shared by all HTTP and WebSocket handlers
#[derive(Clone)]
pub struct ApiState {
    /// Request-processing service (owns the shared store)
    pub service: Arc<CollabService>,
    /// Static agent roster
    pub agents: Arc<Vec<Agent>>,
    /// Selected processing backend
    pub backend: BackendKind,
    /// Number of currently connected WebSocket clients
    pub ws_connections: Arc<AtomicUsize>,
}

impl ApiState {
    /// Build handler state around a service and roster
    pub fn new(service: Arc<CollabService>, agents: Vec<Agent>, backend: BackendKind) -> Self {
        Self {
            service,
            agents: Arc::new(agents),
            backend,
            ws_connections: Arc::new(AtomicUsize::new(0)),
        }
    }
}
