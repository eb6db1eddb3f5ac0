//! Bearer token authentication extractor.
//!
//! Reads `Authorization: Bearer <token>` and resolves it to a verified user
//! through the shared [`Authenticator`](tenantgate_core::auth::Authenticator).
//! Every failure becomes a uniform 401.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use tenantgate_types::identity::VerifiedUser;

use crate::http::error::AppError;
use crate::state::AppState;

/// A request whose bearer credential has been verified.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub VerifiedUser);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A header that is not valid UTF-8 is treated as absent.
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let user = state.authenticator.authenticate(header).await?;
        tracing::debug!(user_id = %user.user_id, method = %user.method, "request authenticated");
        Ok(AuthenticatedUser(user))
    }
}
