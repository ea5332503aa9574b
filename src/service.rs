//! Request submission and processing
//!
//! `CollabService` is the one entry point for submitting a user request.
//! It enforces the single-flight policy, drives either the native scripted
//! conversation or the external adapter path, and records the terminal
//! status. Failures keep everything emitted so far; there is no rollback.

use crate::adapter::AutogenClient;
use crate::error::AppError;
use crate::simulation::{run_conversation, Delay};
use crate::state::{
    MessageType, RequestStatus, SharedStore, StoreEvent, Trace, UserRequest, COORDINATOR_ID,
    USER_RECIPIENT,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};

/// Drives user requests through the collaboration workflow
pub struct CollabService {
    store: SharedStore,
    delay: Arc<dyn Delay>,
    adapter: Option<Arc<AutogenClient>>,
}

impl CollabService {
    /// Service using the native scripted conversation
    pub fn native(store: SharedStore, delay: Arc<dyn Delay>) -> Self {
        Self {
            store,
            delay,
            adapter: None,
        }
    }

    /// Service proxying text generation to the external backend
    pub fn with_adapter(
        store: SharedStore,
        delay: Arc<dyn Delay>,
        adapter: Arc<AutogenClient>,
    ) -> Self {
        Self {
            store,
            delay,
            adapter: Some(adapter),
        }
    }

    /// The shared store this service mutates
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Submit a user request and run it to completion
    ///
    /// Rejects immediately (without touching any collection) when another
    /// request is in flight. Returns the request in its terminal state:
    /// `completed` with the final response as result, or `failed` with the
    /// error text.
    pub async fn submit_user_request(&self, content: &str) -> Result<UserRequest, AppError> {
        let request = self.begin(content).await?;
        self.process(&request).await
    }

    /// Accept a request without running it
    ///
    /// Performs validation and the single-flight check, records the
    /// request with `processing` status, and raises the processing flag.
    /// The caller must follow up with [`Self::process`]. Used by the HTTP
    /// handler, which responds before the conversation finishes.
    pub async fn begin(&self, content: &str) -> Result<UserRequest, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "request text must not be empty".to_string(),
            ));
        }

        let request = {
            let mut store = self.store.write().await;
            if store.is_processing() {
                return Err(AppError::AlreadyProcessing);
            }
            store.set_processing(true);
            store.add_user_request(UserRequest::new(content))
        };
        info!(request_id = %request.id, "request accepted");
        Ok(request)
    }

    /// Run an accepted request to its terminal status
    pub async fn process(&self, request: &UserRequest) -> Result<UserRequest, AppError> {
        let outcome = match &self.adapter {
            None => run_conversation(&self.store, self.delay.as_ref(), request).await,
            Some(adapter) => self.run_external(adapter, request).await,
        };

        let mut store = self.store.write().await;
        let finished = match outcome {
            Ok(solution) => store
                .update_user_request(&request.id, RequestStatus::Completed, Some(solution)),
            Err(e) => {
                error!(request_id = %request.id, error = %e, "request failed");
                store.add_trace(Trace::new(COORDINATOR_ID, "error", &format!("Error: {e}")));
                store.update_user_request(
                    &request.id,
                    RequestStatus::Failed,
                    Some(e.to_string()),
                )
            }
        };
        store.set_processing(false);

        finished.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("request {} vanished from store", request.id))
        })
    }

    // External path: hand the text to the backend and wait for the push
    // channel to deliver the response-typed message addressed to the user.
    async fn run_external(
        &self,
        adapter: &AutogenClient,
        request: &UserRequest,
    ) -> Result<String, AppError> {
        // Subscribe before creating the conversation so no frame is missed.
        let mut events = self.store.read().await.subscribe_events();

        if !adapter.connect().await? {
            return Err(AppError::BackendUnavailable(
                "external backend is not ready (AutoGen missing or no API key)".to_string(),
            ));
        }

        let conversation_id = adapter.create_conversation(&request.content).await?;
        self.store.write().await.add_trace(Trace::new(
            COORDINATOR_ID,
            "conversation_created",
            &format!("External conversation {conversation_id}"),
        ));

        loop {
            match events.recv().await {
                Ok(StoreEvent::Message(message))
                    if message.to == USER_RECIPIENT
                        && message.message_type == MessageType::Response =>
                {
                    return Ok(message.content);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    // Snapshot consumers tolerate loss; a skipped response
                    // message here would wedge the request, so fail loudly.
                    return Err(AppError::Transport(format!(
                        "event stream lagged, {skipped} updates lost"
                    )));
                }
                Err(RecvError::Closed) => {
                    return Err(AppError::Transport("event stream closed".to_string()));
                }
            }
        }
    }
}
