// State management module
// Domain records, the in-memory store, and the static agent roster

pub mod agents;
pub mod models;
pub mod store;

pub use agents::{default_agents, COORDINATOR_ID, EXECUTOR_ID, PLANNER_ID, RESEARCHER_ID};
pub use models::{
    Agent, AgentId, AgentRole, AgentTask, Message, MessageType, RequestStatus, TaskStatus, Trace,
    UserRequest, USER_RECIPIENT,
};
pub use store::{CollabStore, StoreEvent, SubscriptionId};

use std::sync::Arc;
use tokio::sync::RwLock;

/// Store handle shared across handlers and background tasks
pub type SharedStore = Arc<RwLock<CollabStore>>;

/// Create a fresh shared store
pub fn shared_store() -> SharedStore {
    Arc::new(RwLock::new(CollabStore::new()))
}
