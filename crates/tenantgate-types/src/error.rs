use thiserror::Error;
use uuid::Uuid;

use crate::llm::LlmError;

/// Reasons a bearer credential was refused.
///
/// The variant is for server-side logs only. Clients always see a generic
/// "Unauthorized".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("missing bearer credential")]
    Missing,

    #[error("malformed credential")]
    Malformed,

    #[error("credential expired")]
    Expired,

    #[error("untrusted issuer")]
    UntrustedIssuer,

    #[error("credential has no subject")]
    NoSubject,

    #[error("credential rejected by identity provider")]
    Rejected,
}

/// Errors from session store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Ownership check failed on a write path. Only the trusted relay sees
    /// this; it is never mapped to a distinct client response.
    #[error("session not owned by requester")]
    OwnershipRejected,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors from the identity provider's backend.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Transport(String),

    #[error("identity provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("identity provider response could not be decoded: {0}")]
    Decode(String),

    #[error("identity provider rejected the credential")]
    Rejected,
}

/// Errors from the prompt relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("prompt is required")]
    EmptyPrompt,

    #[error("session not found")]
    NotFound,

    /// The session exists (it may have been created for this prompt) and
    /// holds the user message.
    #[error("upstream completion failed: {source}")]
    Upstream { session_id: Uuid, source: LlmError },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from repository operations (used by trait definitions in tenantgate-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),
}

impl From<RepositoryError> for StoreError {
    fn from(e: RepositoryError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_display() {
        assert_eq!(AuthFailure::Expired.to_string(), "credential expired");
        assert_eq!(AuthFailure::UntrustedIssuer.to_string(), "untrusted issuer");
    }

    #[test]
    fn test_relay_error_wraps_upstream() {
        let err = RelayError::Upstream {
            session_id: Uuid::nil(),
            source: LlmError::Timeout { seconds: 30 },
        };
        assert!(err.to_string().contains("timed out"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_repository_error_into_store_error() {
        let err: StoreError = RepositoryError::Query("syntax error".to_string()).into();
        assert_eq!(err.to_string(), "storage backend error: query error: syntax error");
    }
}
