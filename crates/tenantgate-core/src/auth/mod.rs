//! Authentication boundary: turns an `Authorization` header into a verified
//! user id, or a reason it could not.

pub mod remote;
pub mod verifier;

use tenantgate_types::error::{AuthFailure, IdentityError};
use tenantgate_types::identity::{VerificationMethod, VerifiedUser};

use self::remote::{BoxRemoteVerifier, RemoteVerifier};
use self::verifier::{CredentialShape, TokenVerifier, bearer_credential, credential_shape};

/// Combines the local token verifier with the optional remote fallback.
pub struct Authenticator {
    verifier: TokenVerifier,
    remote: Option<BoxRemoteVerifier>,
}

impl Authenticator {
    /// Local verification only. Opaque credentials are rejected.
    pub fn local(verifier: TokenVerifier) -> Self {
        Self {
            verifier,
            remote: None,
        }
    }

    /// Local verification with a remote fallback for opaque credentials.
    pub fn with_remote(verifier: TokenVerifier, remote: BoxRemoteVerifier) -> Self {
        Self {
            verifier,
            remote: Some(remote),
        }
    }

    /// Verify an `Authorization` header value.
    ///
    /// Three-segment tokens are checked locally and never reach the network.
    /// Opaque credentials go to the identity provider when one is configured.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<VerifiedUser, AuthFailure> {
        let credential = bearer_credential(header)?;

        match credential_shape(credential) {
            CredentialShape::Structured => {
                let user_id = self.verifier.verify(credential)?;
                Ok(VerifiedUser {
                    user_id,
                    method: VerificationMethod::LocalClaims,
                })
            }
            CredentialShape::Opaque => {
                let remote = self.remote.as_ref().ok_or(AuthFailure::Malformed)?;
                let user_id = remote
                    .verify_session(credential)
                    .await
                    .map_err(remote_failure)?;
                Ok(VerifiedUser {
                    user_id,
                    method: VerificationMethod::Remote,
                })
            }
            CredentialShape::Malformed => Err(AuthFailure::Malformed),
        }
    }

    /// Redeem a sign-in ticket through the identity provider.
    pub async fn exchange_ticket(&self, ticket: &str) -> Result<String, AuthFailure> {
        let remote = self.remote.as_ref().ok_or(AuthFailure::Rejected)?;
        remote.exchange_ticket(ticket).await.map_err(remote_failure)
    }
}

fn remote_failure(e: IdentityError) -> AuthFailure {
    match e {
        IdentityError::Rejected | IdentityError::Status { .. } => {
            tracing::debug!(error = %e, "identity provider refused credential");
        }
        IdentityError::Transport(_) | IdentityError::Decode(_) => {
            tracing::warn!(error = %e, "identity provider verification failed");
        }
    }
    AuthFailure::Rejected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verifier::tests::{ISSUER, ISSUER_PATTERN, token};
    use serde_json::json;

    struct StubRemote;

    impl RemoteVerifier for StubRemote {
        async fn verify_session(&self, credential: &str) -> Result<String, IdentityError> {
            match credential {
                "sess_good" => Ok("user_remote".to_string()),
                "sess_down" => Err(IdentityError::Transport("connection refused".to_string())),
                _ => Err(IdentityError::Rejected),
            }
        }

        async fn exchange_ticket(&self, ticket: &str) -> Result<String, IdentityError> {
            if ticket == "tkt_ok" {
                Ok("user_ticket".to_string())
            } else {
                Err(IdentityError::Status { status: 422 })
            }
        }
    }

    fn local() -> Authenticator {
        Authenticator::local(TokenVerifier::new(ISSUER_PATTERN).unwrap())
    }

    fn with_remote() -> Authenticator {
        Authenticator::with_remote(
            TokenVerifier::new(ISSUER_PATTERN).unwrap(),
            BoxRemoteVerifier::new(StubRemote),
        )
    }

    fn live_token(sub: &str) -> String {
        let exp = chrono::Utc::now().timestamp() + 3_600;
        token(json!({"sub": sub, "iss": ISSUER, "exp": exp}))
    }

    #[tokio::test]
    async fn test_structured_token_verified_locally() {
        let header = format!("Bearer {}", live_token("user_1"));
        let user = local().authenticate(Some(&header)).await.unwrap();
        assert_eq!(user.user_id, "user_1");
        assert_eq!(user.method, VerificationMethod::LocalClaims);
    }

    #[tokio::test]
    async fn test_missing_header() {
        assert_eq!(local().authenticate(None).await, Err(AuthFailure::Missing));
    }

    #[tokio::test]
    async fn test_two_segment_token_never_goes_remote() {
        let result = with_remote().authenticate(Some("Bearer invalid.token")).await;
        assert_eq!(result, Err(AuthFailure::Malformed));
    }

    #[tokio::test]
    async fn test_opaque_without_remote_is_malformed() {
        let result = local().authenticate(Some("Bearer sess_good")).await;
        assert_eq!(result, Err(AuthFailure::Malformed));
    }

    #[tokio::test]
    async fn test_opaque_with_remote() {
        let auth = with_remote();
        let user = auth.authenticate(Some("Bearer sess_good")).await.unwrap();
        assert_eq!(user.user_id, "user_remote");
        assert_eq!(user.method, VerificationMethod::Remote);

        assert_eq!(
            auth.authenticate(Some("Bearer sess_bad")).await,
            Err(AuthFailure::Rejected)
        );
        assert_eq!(
            auth.authenticate(Some("Bearer sess_down")).await,
            Err(AuthFailure::Rejected)
        );
    }

    #[tokio::test]
    async fn test_exchange_ticket() {
        let auth = with_remote();
        assert_eq!(auth.exchange_ticket("tkt_ok").await.unwrap(), "user_ticket");
        assert_eq!(auth.exchange_ticket("tkt_bad").await, Err(AuthFailure::Rejected));
        assert_eq!(local().exchange_ticket("tkt_ok").await, Err(AuthFailure::Rejected));
    }
}
