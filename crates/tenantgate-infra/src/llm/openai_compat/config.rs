//! Connection settings for an OpenAI-compatible completion endpoint.

use std::time::Duration;

use secrecy::SecretString;

use tenantgate_types::config::UpstreamConfig;

/// Settings used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: SecretString,
    /// Used when a request leaves `model` empty.
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    /// Build from the upstream section of the gateway config.
    ///
    /// Returns `None` when no API key is configured.
    pub fn from_upstream(upstream: &UpstreamConfig) -> Option<Self> {
        let key = upstream.api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(key.to_string()),
            model: upstream.model.clone(),
            timeout: Duration::from_secs(upstream.timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_from_upstream_trims_base_url() {
        let upstream = UpstreamConfig {
            base_url: "http://localhost:9000/v1/".to_string(),
            api_key: Some("sk-test".to_string()),
            ..UpstreamConfig::default()
        };
        let config = OpenAiCompatConfig::from_upstream(&upstream).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.api_key.expose_secret(), "sk-test");
        assert_eq!(config.timeout, Duration::from_secs(upstream.timeout_secs));
    }

    #[test]
    fn test_from_upstream_requires_key() {
        let upstream = UpstreamConfig {
            api_key: Some("   ".to_string()),
            ..UpstreamConfig::default()
        };
        assert!(OpenAiCompatConfig::from_upstream(&upstream).is_none());
        assert!(OpenAiCompatConfig::from_upstream(&UpstreamConfig::default()).is_none());
    }
}
