//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances shared by every request.
//! The relay is generic over store/provider traits; AppState pins it to the
//! boxed implementations so the backend can be chosen from configuration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use secrecy::SecretString;

use tenantgate_core::auth::Authenticator;
use tenantgate_core::auth::remote::BoxRemoteVerifier;
use tenantgate_core::auth::verifier::TokenVerifier;
use tenantgate_core::llm::box_provider::BoxLlmProvider;
use tenantgate_core::relay::service::{PromptRelay, RelaySettings};
use tenantgate_core::store::box_store::BoxSessionStore;
use tenantgate_infra::identity::IdentityProviderClient;
use tenantgate_infra::llm::create_provider;
use tenantgate_infra::store::create_session_store;
use tenantgate_types::config::GatewayConfig;

/// The relay pinned to runtime-selected implementations.
pub type ConcreteRelay = PromptRelay<BoxSessionStore, BoxLlmProvider>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Same store instance the relay writes to.
    pub store: Arc<BoxSessionStore>,
    pub relay: Arc<ConcreteRelay>,
    pub authenticator: Arc<Authenticator>,
    pub started_at: Instant,
}

impl AppState {
    /// Initialize the application state from a validated config.
    pub async fn init(config: &GatewayConfig) -> anyhow::Result<Self> {
        let store = create_session_store(&config.storage).await?;

        let provider = create_provider(&config.upstream).context("failed to configure upstream")?;

        let verifier = TokenVerifier::new(&config.auth.issuer_pattern)
            .with_context(|| format!("invalid issuer pattern: {}", config.auth.issuer_pattern))?;
        tracing::warn!(
            "bearer token signatures are not verified; claims are trusted after issuer and expiry checks"
        );

        let authenticator = if config.auth.remote_verification {
            let secret = config
                .auth
                .identity_secret
                .clone()
                .context("auth.identity_secret is required for remote verification")?;
            let client = IdentityProviderClient::new(
                &config.auth.identity_base_url,
                SecretString::from(secret),
            )
            .context("failed to build identity provider client")?;
            tracing::info!(base_url = %config.auth.identity_base_url, "remote verification enabled");
            Authenticator::with_remote(verifier, BoxRemoteVerifier::new(client))
        } else {
            Authenticator::local(verifier)
        };

        let settings = RelaySettings {
            model: config.upstream.model.clone(),
            system_prompt: config.upstream.system_prompt.clone(),
            timeout: Duration::from_secs(config.upstream.timeout_secs),
        };

        Ok(Self::from_parts(store, provider, authenticator, settings))
    }

    /// Assemble state from already-built components.
    pub fn from_parts(
        store: BoxSessionStore,
        provider: BoxLlmProvider,
        authenticator: Authenticator,
        settings: RelaySettings,
    ) -> Self {
        let store = Arc::new(store);
        let relay = PromptRelay::new(Arc::clone(&store), provider, settings);

        Self {
            store,
            relay: Arc::new(relay),
            authenticator: Arc::new(authenticator),
            started_at: Instant::now(),
        }
    }
}
