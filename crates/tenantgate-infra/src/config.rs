//! Gateway configuration loader.
//!
//! Resolution order, later wins:
//! 1. [`GatewayConfig::default()`]
//! 2. The TOML file given by `--config` or `TENANTGATE_CONFIG`, if any
//! 3. `TENANTGATE_*` environment variables (`OPENAI_API_KEY` as a fallback
//!    for the upstream key)
//!
//! The merged result is validated before it is returned.

use std::path::{Path, PathBuf};

use anyhow::Context;

use tenantgate_types::config::GatewayConfig;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "TENANTGATE_CONFIG";

/// Load, overlay and validate the gateway configuration.
///
/// An explicitly named file that cannot be read or parsed is an error;
/// running without any file is not.
pub async fn load_config(path: Option<&Path>) -> anyhow::Result<GatewayConfig> {
    let config = load_config_unvalidated(path).await?;
    config.validate().context("invalid configuration")?;

    tracing::debug!(config = ?config, "configuration loaded");
    Ok(config)
}

/// Load and overlay without validating. For operator tooling that needs
/// only part of the configuration.
pub async fn load_config_unvalidated(path: Option<&Path>) -> anyhow::Result<GatewayConfig> {
    let path: Option<PathBuf> = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut config = match &path {
        Some(path) => read_config_file(path).await?,
        None => {
            tracing::debug!("no config file given, using defaults");
            GatewayConfig::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

async fn read_config_file(path: &Path) -> anyhow::Result<GatewayConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let config = toml::from_str::<GatewayConfig>(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so tests need not touch the process
/// environment. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("TENANTGATE_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("TENANTGATE_PORT") {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("TENANTGATE_PORT is not a valid port: {port}"))?;
    }

    if let Some(backend) = get("TENANTGATE_STORAGE_BACKEND") {
        config.storage.backend = backend.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(url) = get("TENANTGATE_DATABASE_URL") {
        config.storage.database_url = url;
    }

    if let Some(pattern) = get("TENANTGATE_ISSUER_PATTERN") {
        config.auth.issuer_pattern = pattern;
    }
    if let Some(flag) = get("TENANTGATE_REMOTE_VERIFICATION") {
        config.auth.remote_verification = parse_flag(&flag)
            .with_context(|| format!("TENANTGATE_REMOTE_VERIFICATION is not a boolean: {flag}"))?;
    }
    if let Some(url) = get("TENANTGATE_IDENTITY_BASE_URL") {
        config.auth.identity_base_url = url;
    }
    if let Some(secret) = get("TENANTGATE_IDENTITY_SECRET") {
        config.auth.identity_secret = Some(secret);
    }

    if let Some(url) = get("TENANTGATE_UPSTREAM_BASE_URL") {
        config.upstream.base_url = url;
    }
    match get("TENANTGATE_UPSTREAM_API_KEY") {
        Some(key) => config.upstream.api_key = Some(key),
        None => {
            if config.upstream.api_key.is_none() {
                config.upstream.api_key = get("OPENAI_API_KEY");
            }
        }
    }
    if let Some(model) = get("TENANTGATE_UPSTREAM_MODEL") {
        config.upstream.model = model;
    }
    if let Some(secs) = get("TENANTGATE_UPSTREAM_TIMEOUT_SECS") {
        config.upstream.timeout_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("TENANTGATE_UPSTREAM_TIMEOUT_SECS is not a number: {secs}"))?;
    }
    if let Some(prompt) = get("TENANTGATE_SYSTEM_PROMPT") {
        config.upstream.system_prompt = Some(prompt);
    }

    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
