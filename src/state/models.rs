//! Domain records for the collaboration workflow
//!
//! Messages and traces are append-only; tasks and user requests mutate
//! only their status/result fields. Nothing is ever deleted outside of an
//! explicit store reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for an agent
pub type AgentId = String;

/// Recipient sentinel used when a message is addressed to the end user
/// rather than to another agent.
pub const USER_RECIPIENT: &str = "user";

/// Fixed role of an agent in the collaboration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Receives the user request, dispatches work, reviews results
    Coordinator,
    /// Gathers information relevant to the request
    Researcher,
    /// Turns research findings into an execution plan
    Planner,
    /// Produces the final solution from the plan
    Executor,
}

/// A role-labeled agent
///
/// Agents are static: the roster is built once at startup and never
/// mutated. They are labels attached to messages/tasks, not independent
/// computational entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    /// Unique identifier for the agent
    pub id: AgentId,
    /// Display name of the agent
    pub name: String,
    /// Role of the agent in the workflow
    pub role: AgentRole,
    /// Skill labels shown in the UI
    pub skills: Vec<String>,
}

impl Agent {
    /// Create a new agent with the given ID, name, role, and skills
    pub fn new(id: &str, name: &str, role: AgentRole, skills: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role,
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Kind of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Initial user submission
    Request,
    /// Final answer delivered to the user
    Response,
    /// Agent-to-agent traffic
    Internal,
}

/// A single message exchanged between agents (or with the user)
///
/// Messages are created once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Unique identifier for the message
    pub id: String,
    /// Sender agent id, or "user"
    pub from: AgentId,
    /// Recipient agent id, or "user"
    pub to: AgentId,
    /// Text content
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Kind of message
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Optional free-form metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl Message {
    /// Create a message with a fresh id and the current timestamp
    pub fn new(from: &str, to: &str, content: &str, message_type: MessageType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.to_string(),
            to: to.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
            message_type,
            metadata: None,
        }
    }
}

/// An append-only log entry describing one simulated reasoning/action step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    /// Unique identifier for the trace entry
    pub id: String,
    /// Agent the entry belongs to
    #[serde(rename = "agentId")]
    pub agent_id: AgentId,
    /// Short action label, e.g. "research_started"
    pub action: String,
    /// Human-readable detail string
    pub details: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Ids of messages this entry relates to, if any
    #[serde(rename = "relatedMessages", skip_serializing_if = "Option::is_none")]
    pub related_messages: Option<Vec<String>>,
}

impl Trace {
    /// Create a trace entry with a fresh id and the current timestamp
    pub fn new(agent_id: &str, action: &str, details: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            agent_id: agent_id.to_string(),
            action: action.to_string(),
            details: details.to_string(),
            timestamp: Utc::now(),
            related_messages: None,
        }
    }
}

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Created but not yet picked up
    #[serde(rename = "pending")]
    Pending,
    /// Currently being worked on
    #[serde(rename = "in-progress")]
    InProgress,
    /// Finished with a result
    #[serde(rename = "completed")]
    Completed,
    /// Aborted with an error
    #[serde(rename = "failed")]
    Failed,
}

/// A unit of simulated work assigned to one agent
///
/// Status and result are the only fields mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentTask {
    /// Unique identifier for the task
    pub id: String,
    /// Agent the task is assigned to
    #[serde(rename = "assignedTo")]
    pub assigned_to: AgentId,
    /// What the task is about
    pub description: String,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// Creation time
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Completion time, set when the task reaches a terminal status
    #[serde(rename = "completedAt", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Result text, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Parent task for hierarchical display
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl AgentTask {
    /// Create a pending task with a fresh id and the current timestamp
    pub fn new(assigned_to: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            assigned_to: assigned_to.to_string(),
            description: description.to_string(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
            parent_id: None,
        }
    }
}

/// Terminal/processing status of a submitted user request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// The conversation is in flight
    Processing,
    /// Finished with a result
    Completed,
    /// Aborted; result holds the error text
    Failed,
}

/// One submitted user request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRequest {
    /// Unique identifier for the request
    pub id: String,
    /// Original text as submitted
    pub content: String,
    /// Submission time
    pub timestamp: DateTime<Utc>,
    /// Current status
    pub status: RequestStatus,
    /// Final response content (or error text on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl UserRequest {
    /// Create a processing request with a fresh id and the current timestamp
    pub fn new(content: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
            status: RequestStatus::Processing,
            result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_wire_field_names() {
        let msg = Message::new("coordinator-1", "researcher-1", "hello", MessageType::Internal);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["from"], "coordinator-1");
        assert_eq!(json["to"], "researcher-1");
        assert_eq!(json["type"], "internal");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_task_status_wire_names() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "in-progress"
        );
        assert_eq!(serde_json::to_value(TaskStatus::Pending).unwrap(), "pending");
    }

    #[test]
    fn test_task_starts_pending_without_completion() {
        let task = AgentTask::new("researcher-1", "Research relevant information");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
        assert!(task.result.is_none());
    }

    #[test]
    fn test_unique_ids() {
        let a = UserRequest::new("one");
        let b = UserRequest::new("one");
        assert_ne!(a.id, b.id);
    }
}
