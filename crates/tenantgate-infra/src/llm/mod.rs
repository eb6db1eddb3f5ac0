//! Upstream completion providers.
//!
//! Contains the concrete [`LlmProvider`](tenantgate_core::llm::provider::LlmProvider)
//! used by the relay, and a factory ([`create_provider`]) that builds it
//! from the `[upstream]` config section.

pub mod openai_compat;

use tenantgate_core::llm::box_provider::BoxLlmProvider;
use tenantgate_types::config::UpstreamConfig;
use tenantgate_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from the upstream configuration.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when no API key is configured.
pub fn create_provider(upstream: &UpstreamConfig) -> Result<BoxLlmProvider, LlmError> {
    let config = OpenAiCompatConfig::from_upstream(upstream).ok_or(LlmError::AuthenticationFailed)?;
    tracing::info!(
        base_url = %config.base_url,
        model = %config.model,
        timeout_secs = config.timeout.as_secs(),
        "upstream provider configured"
    );
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(config)?))
}
