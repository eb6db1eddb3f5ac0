//! `tgate check-config`: print the effective configuration.

use std::fmt::Write;

use console::style;
use serde_json::json;

use tenantgate_types::config::GatewayConfig;

use super::OutputMode;

fn secret_state(value: &Option<String>) -> &'static str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => "set",
        _ => "unset",
    }
}

/// Print the already-validated config. Secrets are reported as set/unset only.
pub fn print_config(config: &GatewayConfig, mode: OutputMode) -> anyhow::Result<()> {
    if let Some(out) = render_config(config, mode)? {
        print!("{out}");
    }
    Ok(())
}

/// `None` in quiet mode.
pub fn render_config(config: &GatewayConfig, mode: OutputMode) -> anyhow::Result<Option<String>> {
    match mode {
        OutputMode::Quiet => Ok(None),
        OutputMode::Json => {
            let value = json!({
                "server": { "host": config.server.host, "port": config.server.port },
                "storage": {
                    "backend": config.storage.backend.to_string(),
                    "databaseUrl": config.storage.database_url,
                },
                "auth": {
                    "issuerPattern": config.auth.issuer_pattern,
                    "remoteVerification": config.auth.remote_verification,
                    "identityBaseUrl": config.auth.identity_base_url,
                    "identitySecret": secret_state(&config.auth.identity_secret),
                },
                "upstream": {
                    "baseUrl": config.upstream.base_url,
                    "apiKey": secret_state(&config.upstream.api_key),
                    "model": config.upstream.model,
                    "timeoutSecs": config.upstream.timeout_secs,
                    "systemPrompt": config.upstream.system_prompt.is_some(),
                },
            });
            Ok(Some(format!("{}\n", serde_json::to_string_pretty(&value)?)))
        }
        OutputMode::Styled => {
            let mut out = String::new();
            writeln!(out)?;
            writeln!(out, "  {} configuration is valid", style("✓").green().bold())?;
            writeln!(out)?;
            writeln!(
                out,
                "  {:<22} {}:{}",
                style("listen").dim(),
                config.server.host,
                config.server.port
            )?;
            writeln!(out, "  {:<22} {}", style("storage").dim(), config.storage.backend)?;
            writeln!(
                out,
                "  {:<22} {}",
                style("issuer pattern").dim(),
                config.auth.issuer_pattern
            )?;
            writeln!(
                out,
                "  {:<22} {}",
                style("remote verification").dim(),
                if config.auth.remote_verification { "on" } else { "off" }
            )?;
            writeln!(
                out,
                "  {:<22} {}",
                style("upstream").dim(),
                style(&config.upstream.base_url).cyan()
            )?;
            writeln!(out, "  {:<22} {}", style("model").dim(), config.upstream.model)?;
            writeln!(
                out,
                "  {:<22} {}s",
                style("timeout").dim(),
                config.upstream.timeout_secs
            )?;
            writeln!(
                out,
                "  {:<22} {}",
                style("api key").dim(),
                secret_state(&config.upstream.api_key)
            )?;
            writeln!(out)?;
            Ok(Some(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.api_key = Some("sk-live-secret".to_string());
        config
    }

    #[test]
    fn test_secret_state() {
        assert_eq!(secret_state(&None), "unset");
        assert_eq!(secret_state(&Some("  ".to_string())), "unset");
        assert_eq!(secret_state(&Some("sk-live".to_string())), "set");
    }

    #[test]
    fn test_quiet_renders_nothing() {
        assert_eq!(render_config(&config(), OutputMode::Quiet).unwrap(), None);
    }

    #[test]
    fn test_json_hides_secrets() {
        let out = render_config(&config(), OutputMode::Json).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["upstream"]["apiKey"], "set");
        assert!(!out.contains("sk-live-secret"));
    }

    #[test]
    fn test_styled_hides_secrets() {
        let out = render_config(&config(), OutputMode::Styled).unwrap().unwrap();
        assert!(out.contains("configuration is valid"));
        assert!(!out.contains("sk-live-secret"));
    }
}
