//! Application error type mapping to HTTP status codes and JSON bodies.
//!
//! Bodies never carry internal error text. Authentication failures all look
//! the same to the client, and a session owned by someone else looks exactly
//! like one that does not exist.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use tenantgate_types::error::{AuthFailure, RelayError, StoreError};
use tenantgate_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Credential missing or not accepted.
    Unauthorized(AuthFailure),
    /// Session absent, foreign, or addressed by a malformed id.
    NotFound,
    /// Request body failed validation; the message is shown to the client.
    Validation(String),
    /// The upstream completion call failed or timed out. The session id is
    /// returned so the client can retry or delete the session.
    Upstream { session_id: Uuid, source: LlmError },
    /// Generic internal error.
    Internal(String),
}

impl From<AuthFailure> for AppError {
    fn from(e: AuthFailure) -> Self {
        AppError::Unauthorized(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OwnershipRejected => AppError::NotFound,
            StoreError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::EmptyPrompt => AppError::Validation("prompt is required".to_string()),
            RelayError::NotFound => AppError::NotFound,
            RelayError::Upstream { session_id, source } => AppError::Upstream { session_id, source },
            RelayError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized(reason) => {
                tracing::debug!(reason = %reason, "request unauthorized");
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
            }
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Session not found" })),
            )
                .into_response(),
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::Upstream { session_id, source } => {
                tracing::debug!(session_id = %session_id, error = %source, "responding with upstream failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Upstream completion failed",
                        "sessionId": session_id,
                    })),
                )
                    .into_response()
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
