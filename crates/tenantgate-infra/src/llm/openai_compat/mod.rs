//! OpenAI-compatible completion provider.
//!
//! Sends one non-streaming `POST {base_url}/chat/completions` per relay and
//! returns the first choice's content. Works against OpenAI and any server
//! that speaks the same protocol.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

pub mod config;
pub mod types;

use secrecy::{ExposeSecret, SecretString};

use tenantgate_core::llm::provider::LlmProvider;
use tenantgate_types::llm::{CompletionRequest, CompletionResponse, LlmError};
use tenantgate_types::session::MessageRole;

use self::config::OpenAiCompatConfig;
use self::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Provider for any OpenAI-compatible chat completions API.
///
/// Does NOT derive Debug so the key cannot end up in logs.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url,
            model: config.model,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// The system prompt, when set, leads the message list.
    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage {
                role: MessageRole::System,
                content: system.to_string(),
            });
        }
        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: m.role,
            content: m.content.clone(),
        }));

        ChatCompletionRequest {
            model,
            messages,
            stream: false,
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        seconds: self.timeout_secs,
                    }
                } else {
                    LlmError::Provider {
                        message: format!("HTTP request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %error_body, "upstream error body");
            return Err(map_status(status.as_u16()));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        Ok(CompletionResponse {
            content,
            model: parsed.model.unwrap_or(body.model),
        })
    }
}

fn map_status(status: u16) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited,
        _ => LlmError::Status { status },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tenantgate_types::llm::Message;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn provider_for(base_url: String) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(OpenAiCompatConfig {
            base_url,
            api_key: SecretString::from("sk-test".to_string()),
            model: "gpt-test".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn request(content: &str) -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![Message {
                role: MessageRole::User,
                content: content.to_string(),
            }],
            system: None,
        }
    }

    fn failing_with(status: StatusCode) -> Router {
        Router::new().route(
            "/v1/chat/completions",
            post(move || async move { (status, "nope") }),
        )
    }

    #[tokio::test]
    async fn test_complete_sends_history_and_key() {
        let captured: Arc<Mutex<Option<(Value, Option<String>)>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&captured);
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *sink.lock().unwrap() = Some((body, auth));
                    Json(json!({
                        "model": "gpt-test-0001",
                        "choices": [{"message": {"role": "assistant", "content": "Hi there"}}]
                    }))
                }
            }),
        );
        let provider = provider_for(spawn_upstream(router).await);

        let mut req = request("Hello");
        req.system = Some("Be brief.".to_string());
        let resp = provider.complete(&req).await.unwrap();
        assert_eq!(resp.content, "Hi there");
        assert_eq!(resp.model, "gpt-test-0001");

        let (body, auth) = captured.lock().unwrap().clone().unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Be brief.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let provider = provider_for(spawn_upstream(failing_with(StatusCode::UNAUTHORIZED)).await);
        assert!(matches!(
            provider.complete(&request("x")).await,
            Err(LlmError::AuthenticationFailed)
        ));

        let provider = provider_for(spawn_upstream(failing_with(StatusCode::TOO_MANY_REQUESTS)).await);
        assert!(matches!(
            provider.complete(&request("x")).await,
            Err(LlmError::RateLimited)
        ));

        let provider = provider_for(spawn_upstream(failing_with(StatusCode::BAD_GATEWAY)).await);
        assert!(matches!(
            provider.complete(&request("x")).await,
            Err(LlmError::Status { status: 502 })
        ));
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_response() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let provider = provider_for(spawn_upstream(router).await);
        assert!(matches!(
            provider.complete(&request("x")).await,
            Err(LlmError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { "not json" }),
        );
        let provider = provider_for(spawn_upstream(router).await);
        assert!(matches!(
            provider.complete(&request("x")).await,
            Err(LlmError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_provider_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = provider_for(format!("http://{addr}/v1"));
        assert!(matches!(
            provider.complete(&request("x")).await,
            Err(LlmError::Provider { .. })
        ));
    }

    #[test]
    fn test_build_request_prefers_request_model() {
        let provider = provider_for("http://localhost".to_string());
        let mut req = request("x");
        assert_eq!(provider.build_request(&req).model, "gpt-test");
        req.model = "gpt-other".to_string();
        assert_eq!(provider.build_request(&req).model, "gpt-other");
        assert_eq!(provider.build_request(&req).messages.len(), 1);
    }
}
