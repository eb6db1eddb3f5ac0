//! PromptRelay: forwards a user's prompt, with the session's full history,
//! to the upstream completion API and records both sides of the exchange.
//!
//! Generic over the store and provider traits; the API layer pins them to
//! `BoxSessionStore` and `BoxLlmProvider`.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use tenantgate_types::error::{RelayError, StoreError};
use tenantgate_types::llm::{CompletionRequest, LlmError, Message};
use tenantgate_types::session::ConversationMessage;

use crate::llm::provider::LlmProvider;
use crate::store::repository::SessionStore;

/// Upstream request settings fixed at startup.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub model: String,
    pub system_prompt: Option<String>,
    pub timeout: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            system_prompt: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a successful relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub reply: String,
    pub session_id: Uuid,
}

pub struct PromptRelay<S: SessionStore, P: LlmProvider> {
    store: Arc<S>,
    provider: P,
    settings: RelaySettings,
}

impl<S: SessionStore, P: LlmProvider> PromptRelay<S, P> {
    pub fn new(store: Arc<S>, provider: P, settings: RelaySettings) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Relay `prompt` for `requester_id`, creating a session when none is given.
    ///
    /// On upstream failure the user message stays in history but no
    /// assistant message is written. The error carries the session id so a
    /// caller that let the relay create the session can still address it.
    pub async fn relay(
        &self,
        session_id: Option<Uuid>,
        requester_id: &str,
        prompt: &str,
    ) -> Result<RelayReply, RelayError> {
        if prompt.trim().is_empty() {
            return Err(RelayError::EmptyPrompt);
        }

        let session_id = match session_id {
            Some(id) => {
                self.store
                    .get_session(&id, requester_id)
                    .await?
                    .ok_or(RelayError::NotFound)?;
                id
            }
            None => self.store.create_session(requester_id).await?.id,
        };

        self.append(&session_id, requester_id, ConversationMessage::user(prompt))
            .await?;

        let history = self.store.get_history(&session_id, requester_id).await?;
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: history.iter().map(Message::from).collect(),
            system: self.settings.system_prompt.clone(),
        };

        let reply = match tokio::time::timeout(self.settings.timeout, self.provider.complete(&request)).await {
            Ok(Ok(response)) => response.content,
            Ok(Err(e)) => {
                tracing::error!(
                    session_id = %session_id,
                    provider = self.provider.name(),
                    error = %e,
                    "upstream completion failed"
                );
                return Err(RelayError::Upstream {
                    session_id,
                    source: e,
                });
            }
            Err(_) => {
                let seconds = self.settings.timeout.as_secs();
                tracing::error!(
                    session_id = %session_id,
                    provider = self.provider.name(),
                    timeout_secs = seconds,
                    "upstream completion timed out"
                );
                return Err(RelayError::Upstream {
                    session_id,
                    source: LlmError::Timeout { seconds },
                });
            }
        };

        self.append(
            &session_id,
            requester_id,
            ConversationMessage::assistant(reply.clone()),
        )
        .await?;

        tracing::info!(
            session_id = %session_id,
            user_id = requester_id,
            history_len = history.len() + 1,
            "prompt relayed"
        );

        Ok(RelayReply { reply, session_id })
    }

    /// A session deleted mid-relay reads as "not found" to the caller.
    async fn append(
        &self,
        session_id: &Uuid,
        requester_id: &str,
        message: ConversationMessage,
    ) -> Result<(), RelayError> {
        match self.store.add_message(session_id, requester_id, message).await {
            Ok(()) => Ok(()),
            Err(StoreError::OwnershipRejected) => Err(RelayError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
