//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// A request was submitted while another one is still processing
    #[error("A request is already being processed; wait for it to finish")]
    AlreadyProcessing,

    /// Submitted request text is empty or invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// User request with the given ID was not found
    #[error("Request not found: {0}")]
    RequestNotFound(String),

    /// The external framework backend is unreachable or not ready
    #[error("External backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Transport-level failure talking to the external framework
    #[error("Transport error: {0}")]
    Transport(String),

    /// The conversation run itself failed
    #[error("Conversation failed: {0}")]
    ConversationFailed(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AlreadyProcessing => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::RequestNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BackendUnavailable(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Transport(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::ConversationFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}
