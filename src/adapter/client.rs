//! HTTP client for the external AutoGen backend
//!
//! Thin pass-through: a readiness probe plus conversation creation. All
//! agent output arrives separately over the push channel.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Response of the external `GET /status` probe
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the AutoGen package is importable on the backend
    #[serde(default)]
    pub autogen_installed: bool,
    /// Whether the backend has an OpenAI API key configured
    #[serde(default)]
    pub openai_api_key_configured: bool,
}

#[derive(Debug, Serialize)]
struct CreateRequestBody<'a> {
    content: &'a str,
    framework: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateRequestResponse {
    conversation_id: String,
}

/// Client for the external framework's HTTP surface
#[derive(Debug)]
pub struct AutogenClient {
    http: reqwest::Client,
    base_url: String,
    connected: AtomicBool,
}

impl AutogenClient {
    /// Create a client against the given base URL (no trailing slash)
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            connected: AtomicBool::new(false),
        }
    }

    /// Whether the last readiness probe succeeded
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Probe the external backend for readiness
    ///
    /// Returns true when the backend is reachable, AutoGen is installed,
    /// and an API key is configured. An unreachable backend is an error;
    /// a reachable but unready one returns Ok(false).
    pub async fn connect(&self) -> Result<bool, AppError> {
        let url = format!("{}/status", self.base_url);
        let response = self.http.get(&url).send().await.map_err(|e| {
            self.connected.store(false, Ordering::SeqCst);
            AppError::BackendUnavailable(format!("status probe failed: {e}"))
        })?;

        if !response.status().is_success() {
            self.connected.store(false, Ordering::SeqCst);
            return Err(AppError::BackendUnavailable(format!(
                "status probe returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let status: BackendStatus = response.json().await?;
        let ready = status.autogen_installed && status.openai_api_key_configured;
        self.connected.store(ready, Ordering::SeqCst);
        if ready {
            info!(url = %url, "external backend ready");
        } else {
            warn!(
                autogen_installed = status.autogen_installed,
                openai_api_key_configured = status.openai_api_key_configured,
                "external backend reachable but not ready"
            );
        }
        Ok(ready)
    }

    /// Create a conversation for the given request text
    ///
    /// Fails if [`Self::connect`] has not succeeded. Returns the opaque
    /// conversation id allocated by the backend.
    pub async fn create_conversation(&self, content: &str) -> Result<String, AppError> {
        if !self.is_connected() {
            return Err(AppError::BackendUnavailable(
                "not connected; call connect() first".to_string(),
            ));
        }

        let url = format!("{}/api/request", self.base_url);
        let body = CreateRequestBody {
            content,
            framework: "autogen",
        };
        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(AppError::Transport(format!(
                "conversation creation returned HTTP {}: {detail}",
                status.as_u16()
            )));
        }

        let created: CreateRequestResponse = response.json().await?;
        info!(conversation_id = %created.conversation_id, "conversation created");
        Ok(created.conversation_id)
    }
}
