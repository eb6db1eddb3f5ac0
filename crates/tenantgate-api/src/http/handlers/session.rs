//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /sessions               - Create a session for the caller
//! - GET    /sessions               - List the caller's sessions
//! - GET    /sessions/{id}          - Get a single session
//! - DELETE /sessions/{id}          - Delete a session and its history
//! - GET    /sessions/{id}/messages - Get a session's message history
//!
//! Every lookup is scoped to the authenticated user. Ids that do not parse
//! get the same 404 as ids that belong to someone else.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use tenantgate_core::store::repository::SessionStore;
use tenantgate_types::session::{ConversationMessage, Session};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub sessions: Vec<Session>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistory {
    pub session_id: Uuid,
    pub messages: Vec<ConversationMessage>,
}

fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

/// POST /sessions
pub async fn create_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = state.store.create_session(user.user_id()).await?;
    tracing::info!(session_id = %session.id, user_id = %user.user_id(), "session created");
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<SessionList>, AppError> {
    let sessions = state.store.list_sessions(user.user_id()).await?;
    Ok(Json(SessionList { sessions }))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let id = parse_session_id(&id)?;
    let session = state
        .store
        .get_session(&id, user.user_id())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session))
}

/// DELETE /sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_session_id(&id)?;
    if state.store.delete_session(&id, user.user_id()).await? {
        tracing::info!(session_id = %id, user_id = %user.user_id(), "session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// GET /sessions/{id}/messages
pub async fn get_session_messages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<SessionHistory>, AppError> {
    let id = parse_session_id(&id)?;
    // An empty history is ambiguous, so check the session itself first.
    state
        .store
        .get_session(&id, user.user_id())
        .await?
        .ok_or(AppError::NotFound)?;

    let messages = state.store.get_history(&id, user.user_id()).await?;
    Ok(Json(SessionHistory {
        session_id: id,
        messages,
    }))
}
