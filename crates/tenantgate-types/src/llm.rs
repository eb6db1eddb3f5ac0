//! Upstream completion request/response types for TenantGate.
//!
//! These model the provider-agnostic shape of a non-streaming chat
//! completion: an ordered message list in, assistant text out.

use serde::{Deserialize, Serialize};

use crate::session::{ConversationMessage, MessageRole};

/// A single message sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl From<&ConversationMessage> for Message {
    fn from(m: &ConversationMessage) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
        }
    }
}

/// Request to an upstream completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Empty means "use the provider's configured default".
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Response from an upstream completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Errors from upstream completion calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("upstream returned no completion choices")]
    EmptyResponse,

    #[error("upstream timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,
}
