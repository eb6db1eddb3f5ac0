//! Identity provider backend client.
//!
//! Implements [`RemoteVerifier`] over the provider's REST API:
//! - `POST {base}/sessions/{id}/verify` confirms an opaque session credential
//! - `POST {base}/client/sign_ins` redeems a one-time sign-in ticket
//!
//! Both calls authenticate with the backend secret as a bearer token.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use tenantgate_core::auth::remote::RemoteVerifier;
use tenantgate_types::error::IdentityError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct VerifiedSession {
    #[serde(alias = "user_id", rename = "userId")]
    user_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    strategy: &'static str,
    ticket: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(alias = "user_id", rename = "userId")]
    user_id: Option<String>,
}

/// HTTP client for the identity provider's backend API.
///
/// Does NOT derive Debug; it holds the backend secret.
pub struct IdentityProviderClient {
    client: reqwest::Client,
    base_url: String,
    secret: SecretString,
}

impl IdentityProviderClient {
    pub fn new(base_url: &str, secret: SecretString) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret,
        })
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, IdentityError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(self.secret.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(IdentityError::Rejected);
        }
        if !status.is_success() {
            return Err(IdentityError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::Decode(e.to_string()))
    }
}

/// Opaque ids are interpolated into a URL path.
fn is_path_safe(credential: &str) -> bool {
    !credential.is_empty()
        && credential
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn non_empty(user_id: Option<String>) -> Result<String, IdentityError> {
    user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(IdentityError::Rejected)
}

impl RemoteVerifier for IdentityProviderClient {
    async fn verify_session(&self, credential: &str) -> Result<String, IdentityError> {
        if !is_path_safe(credential) {
            return Err(IdentityError::Rejected);
        }

        let session: VerifiedSession = self
            .post_json(&format!("/sessions/{credential}/verify"), &serde_json::json!({}))
            .await?;

        if session.status.as_deref() != Some("active") {
            tracing::debug!(status = ?session.status, "identity provider session not active");
            return Err(IdentityError::Rejected);
        }
        non_empty(session.user_id)
    }

    async fn exchange_ticket(&self, ticket: &str) -> Result<String, IdentityError> {
        if ticket.trim().is_empty() {
            return Err(IdentityError::Rejected);
        }

        let response: SignInResponse = self
            .post_json(
                "/client/sign_ins",
                &SignInRequest {
                    strategy: "ticket",
                    ticket: ticket.trim(),
                },
            )
            .await?;
        non_empty(response.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn client_for(base_url: &str) -> IdentityProviderClient {
        IdentityProviderClient::new(base_url, SecretString::from("sk_backend".to_string())).unwrap()
    }

    fn provider_router(seen_auth: Arc<Mutex<Vec<String>>>) -> Router {
        let verify_auth = Arc::clone(&seen_auth);
        Router::new()
            .route(
                "/v1/sessions/{id}/verify",
                post(move |Path(id): Path<String>, headers: HeaderMap| {
                    let seen = Arc::clone(&verify_auth);
                    async move {
                        if let Some(v) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
                            seen.lock().unwrap().push(v.to_string());
                        }
                        match id.as_str() {
                            "sess_active" => (
                                StatusCode::OK,
                                Json(json!({"userId": "user_abc", "status": "active"})),
                            ),
                            "sess_snake" => (
                                StatusCode::OK,
                                Json(json!({"user_id": "user_snake", "status": "active"})),
                            ),
                            "sess_ended" => (
                                StatusCode::OK,
                                Json(json!({"userId": "user_abc", "status": "ended"})),
                            ),
                            "sess_broken" => (
                                StatusCode::SERVICE_UNAVAILABLE,
                                Json(json!({"error": "down"})),
                            ),
                            _ => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))),
                        }
                    }
                }),
            )
            .route(
                "/v1/client/sign_ins",
                post(|Json(body): Json<Value>| async move {
                    if body["strategy"] == "ticket" && body["ticket"] == "tkt_good" {
                        (StatusCode::OK, Json(json!({"userId": "user_ticket"})))
                    } else {
                        (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"error": "bad ticket"})))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_verify_active_session() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_provider(provider_router(Arc::clone(&seen))).await;
        let client = client_for(&base);

        assert_eq!(client.verify_session("sess_active").await.unwrap(), "user_abc");
        assert_eq!(client.verify_session("sess_snake").await.unwrap(), "user_snake");
        assert_eq!(seen.lock().unwrap()[0], "Bearer sk_backend");
    }

    #[tokio::test]
    async fn test_verify_rejects_inactive_or_unknown() {
        let base = spawn_provider(provider_router(Arc::new(Mutex::new(Vec::new())))).await;
        let client = client_for(&base);

        assert!(matches!(
            client.verify_session("sess_ended").await,
            Err(IdentityError::Rejected)
        ));
        assert!(matches!(
            client.verify_session("sess_unknown").await,
            Err(IdentityError::Rejected)
        ));
        assert!(matches!(
            client.verify_session("sess_broken").await,
            Err(IdentityError::Status { status: 503 })
        ));
    }

    #[tokio::test]
    async fn test_verify_refuses_unsafe_ids_without_calling() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_provider(provider_router(Arc::clone(&seen))).await;
        let client = client_for(&base);

        assert!(matches!(
            client.verify_session("../admin").await,
            Err(IdentityError::Rejected)
        ));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_ticket() {
        let base = spawn_provider(provider_router(Arc::new(Mutex::new(Vec::new())))).await;
        let client = client_for(&base);

        assert_eq!(client.exchange_ticket("tkt_good").await.unwrap(), "user_ticket");
        assert!(matches!(
            client.exchange_ticket("tkt_bad").await,
            Err(IdentityError::Rejected)
        ));
        assert!(matches!(
            client.exchange_ticket("  ").await,
            Err(IdentityError::Rejected)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{addr}/v1"));
        assert!(matches!(
            client.verify_session("sess_active").await,
            Err(IdentityError::Transport(_))
        ));
    }
}
