//! Prompt relay HTTP handler.
//!
//! POST /prompt forwards the caller's prompt, with the session's history,
//! to the upstream completion endpoint. Without a `sessionId` a new session
//! is created and its id returned.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub success: bool,
    pub response: String,
    pub session_id: Uuid,
}

/// POST /prompt
pub async fn relay_prompt(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, AppError> {
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected prompt body");
        AppError::Validation("request body must be a JSON object".to_string())
    })?;

    let prompt = req
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("prompt is required".to_string()))?;

    let session_id = match req.session_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| AppError::NotFound)?),
    };

    let reply = state
        .relay
        .relay(session_id, user.user_id(), &prompt)
        .await?;

    Ok(Json(PromptResponse {
        success: true,
        response: reply.reply,
        session_id: reply.session_id,
    }))
}
