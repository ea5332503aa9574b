//! In-memory state store and change notifier
//!
//! `CollabStore` is the single authority for the four collections
//! (messages, traces, tasks, user requests). Every mutation synchronously
//! notifies registered subscribers and mirrors the change onto a broadcast
//! channel consumed by the WebSocket layer.
//!
//! The store carries no interior locking; callers share it as
//! `Arc<RwLock<CollabStore>>` and mutate it from a single logical flow.

use crate::state::models::{
    AgentTask, Message, RequestStatus, TaskStatus, Trace, UserRequest,
};
use chrono::Utc;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::sync::broadcast;
use tracing::warn;

/// Capacity of the broadcast event channel; slow WebSocket consumers that
/// fall further behind than this lag and skip.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Handle returned by [`CollabStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A change that occurred in the store
///
/// Variant names match the frame types pushed over the WebSocket.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A message was appended
    Message(Message),
    /// A trace entry was appended
    Trace(Trace),
    /// A task was created
    Task(AgentTask),
    /// An existing task changed status/result
    TaskUpdate(AgentTask),
    /// A user request was created or changed status/result
    RequestUpdate(UserRequest),
    /// All collections were reset
    Cleared,
}

type UpdateCallback = Box<dyn Fn() + Send + Sync>;

/// In-memory store for the four collaboration collections
pub struct CollabStore {
    messages: Vec<Message>,
    traces: Vec<Trace>,
    tasks: Vec<AgentTask>,
    user_requests: Vec<UserRequest>,
    processing: bool,
    subscribers: Vec<(SubscriptionId, UpdateCallback)>,
    next_subscription: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for CollabStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CollabStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollabStore")
            .field("messages", &self.messages.len())
            .field("traces", &self.traces.len())
            .field("tasks", &self.tasks.len())
            .field("user_requests", &self.user_requests.len())
            .field("processing", &self.processing)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl CollabStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            messages: Vec::new(),
            traces: Vec::new(),
            tasks: Vec::new(),
            user_requests: Vec::new(),
            processing: false,
            subscribers: Vec::new(),
            next_subscription: 0,
            events,
        }
    }

    /// Get a copy of all messages
    pub fn messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Get a copy of all trace entries
    pub fn traces(&self) -> Vec<Trace> {
        self.traces.clone()
    }

    /// Get a copy of all tasks
    pub fn tasks(&self) -> Vec<AgentTask> {
        self.tasks.clone()
    }

    /// Get a copy of all user requests
    pub fn user_requests(&self) -> Vec<UserRequest> {
        self.user_requests.clone()
    }

    /// Whether a request is currently being processed
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Set the single-flight processing flag
    pub fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    /// Register an update callback
    ///
    /// The callback is invoked synchronously after every mutation, in
    /// registration order. Returns a handle for [`Self::unsubscribe`].
    pub fn subscribe(&mut self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a previously registered callback
    ///
    /// Returns true if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Subscribe to the typed event stream (used by the WebSocket layer)
    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Append a message and notify
    pub fn add_message(&mut self, message: Message) -> Message {
        self.messages.push(message.clone());
        self.notify(StoreEvent::Message(message.clone()));
        message
    }

    /// Append a trace entry and notify
    pub fn add_trace(&mut self, trace: Trace) -> Trace {
        self.traces.push(trace.clone());
        self.notify(StoreEvent::Trace(trace.clone()));
        trace
    }

    /// Append a task and notify
    pub fn add_task(&mut self, task: AgentTask) -> AgentTask {
        self.tasks.push(task.clone());
        self.notify(StoreEvent::Task(task.clone()));
        task
    }

    /// Update a task's status (and optionally result) in place
    ///
    /// Terminal statuses also set `completedAt`. Returns the updated task,
    /// or None if the id is unknown.
    pub fn update_task(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        result: Option<String>,
    ) -> Option<AgentTask> {
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.status = status;
        if matches!(status, TaskStatus::Completed | TaskStatus::Failed) {
            task.completed_at = Some(Utc::now());
        }
        if let Some(result) = result {
            task.result = Some(result);
        }
        let updated = task.clone();
        self.notify(StoreEvent::TaskUpdate(updated.clone()));
        Some(updated)
    }

    /// Append a user request and notify
    pub fn add_user_request(&mut self, request: UserRequest) -> UserRequest {
        self.user_requests.push(request.clone());
        self.notify(StoreEvent::RequestUpdate(request.clone()));
        request
    }

    /// Update a user request's status (and optionally result) in place
    ///
    /// Returns the updated request, or None if the id is unknown.
    pub fn update_user_request(
        &mut self,
        request_id: &str,
        status: RequestStatus,
        result: Option<String>,
    ) -> Option<UserRequest> {
        let request = self.user_requests.iter_mut().find(|r| r.id == request_id)?;
        request.status = status;
        if let Some(result) = result {
            request.result = Some(result);
        }
        let updated = request.clone();
        self.notify(StoreEvent::RequestUpdate(updated.clone()));
        Some(updated)
    }

    /// Look up a user request by id
    pub fn user_request(&self, request_id: &str) -> Option<UserRequest> {
        self.user_requests.iter().find(|r| r.id == request_id).cloned()
    }

    /// Reset all collections and the processing flag, then notify
    ///
    /// Used for test isolation and the explicit dashboard reset.
    pub fn clear_data(&mut self) {
        self.messages.clear();
        self.traces.clear();
        self.tasks.clear();
        self.user_requests.clear();
        self.processing = false;
        self.notify(StoreEvent::Cleared);
    }

    // Fan out one change to every subscriber, in registration order.
    // A panicking subscriber is logged and skipped; the rest still run.
    fn notify(&self, event: StoreEvent) {
        // No receivers is fine; the error only means nobody is listening.
        let _ = self.events.send(event);

        for (id, callback) in &self.subscribers {
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                warn!(subscription = id.0, "update callback panicked; continuing");
            }
        }
    }
}
