//! Sign-in ticket exchange.
//!
//! POST /auth/ticket redeems a one-time identity provider ticket and returns
//! the user id it signs in. Only available with remote verification enabled;
//! otherwise every ticket is refused.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    #[serde(default)]
    pub ticket: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub user_id: String,
}

/// POST /auth/ticket
pub async fn exchange_ticket(
    State(state): State<AppState>,
    body: Result<Json<TicketRequest>, JsonRejection>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = body
        .ok()
        .and_then(|Json(req)| req.ticket)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("ticket is required".to_string()))?;

    let user_id = state.authenticator.exchange_ticket(ticket.trim()).await?;
    tracing::info!(user_id = %user_id, "ticket exchanged");
    Ok(Json(TicketResponse { user_id }))
}
