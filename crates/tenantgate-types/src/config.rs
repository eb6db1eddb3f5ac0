//! Gateway configuration types for TenantGate.
//!
//! `GatewayConfig` is the schema of the optional `tenantgate.toml` file. The
//! loader in `tenantgate-infra` overlays environment variables on top and
//! calls [`GatewayConfig::validate`] before anything is wired.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// Top-level gateway configuration. Every section has defaults; only the
/// secrets must be supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Which session store implementation to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("invalid storage backend: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// SQLite URL, used only when `backend = "sqlite"`.
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: "sqlite://tenantgate.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Regular expression the token `iss` claim must match.
    pub issuer_pattern: String,
    /// Resolve non-JWT credentials through the identity provider's backend.
    pub remote_verification: bool,
    pub identity_base_url: String,
    #[serde(skip_serializing)]
    pub identity_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer_pattern: r"^https://[a-z0-9-]+\.clerk\.accounts\.dev$".to_string(),
            remote_verification: false,
            identity_base_url: "https://api.clerk.com/v1".to_string(),
            identity_secret: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer_pattern", &self.issuer_pattern)
            .field("remote_verification", &self.remote_verification)
            .field("identity_base_url", &self.identity_base_url)
            .field("identity_secret", &self.identity_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    /// Upper bound on a single completion call.
    pub timeout_secs: u64,
    /// Prepended as a system message when set.
    pub system_prompt: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

/// Startup configuration problems. The process refuses to start on any of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).is_none_or(str::is_empty)
}

impl GatewayConfig {
    /// Check that every required key is present and well-formed.
    ///
    /// The issuer pattern is only checked for non-emptiness here; the
    /// verifier compiles it and reports regex errors itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(&self.upstream.api_key) {
            return Err(ConfigError::Missing("upstream.api_key"));
        }
        if self.upstream.model.trim().is_empty() {
            return Err(ConfigError::Missing("upstream.model"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "upstream.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.auth.issuer_pattern.trim().is_empty() {
            return Err(ConfigError::Missing("auth.issuer_pattern"));
        }
        if self.auth.remote_verification && is_blank(&self.auth.identity_secret) {
            return Err(ConfigError::Missing("auth.identity_secret"));
        }
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.database_url.trim().is_empty()
        {
            return Err(ConfigError::Missing("storage.database_url"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.api_key = Some("sk-test".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.upstream.timeout_secs, 60);
        assert!(!config.auth.remote_verification);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = GatewayConfig::default();
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing("upstream.api_key"))
        );

        let mut blank = GatewayConfig::default();
        blank.upstream.api_key = Some("   ".to_string());
        assert_eq!(blank.validate(), Err(ConfigError::Missing("upstream.api_key")));

        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_validate_remote_verification_needs_secret() {
        let mut config = valid();
        config.auth.remote_verification = true;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing("auth.identity_secret"))
        );
        config.auth.identity_secret = Some("sk_live_x".to_string());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = valid();
        config.upstream.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "upstream.timeout_secs", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = valid();
        config.auth.identity_secret = Some("sk_live_very_secret".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-test"));
        assert!(!debug.contains("sk_live_very_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
[storage]
backend = "sqlite"

[upstream]
model = "gpt-4o"
timeout_secs = 15
"#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.upstream.model, "gpt-4o");
        assert_eq!(config.upstream.timeout_secs, 15);
        assert_eq!(config.server.port, 8787);
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }
}
