//! `tgate verify-token`: decode a bearer token locally for operators.
//!
//! Runs the same checks the gateway runs on three-segment tokens. Opaque
//! credentials are not sent to the identity provider.

use std::fmt::Write;

use console::style;
use serde_json::json;

use tenantgate_core::auth::verifier::{
    CredentialShape, TokenVerifier, credential_shape, decode_claims,
};
use tenantgate_types::identity::TokenClaims;

use super::OutputMode;

/// Outcome of a local token check.
#[derive(Debug)]
pub struct TokenReport {
    pub accepted: bool,
    /// What to print; `None` in quiet mode.
    pub output: Option<String>,
}

/// Print the token's claims and the local verdict.
///
/// Returns `Ok(false)` when the gateway would refuse the token.
pub fn verify_token(issuer_pattern: &str, token: &str, mode: OutputMode) -> anyhow::Result<bool> {
    let report = check_token(issuer_pattern, token, mode)?;
    if let Some(out) = &report.output {
        print!("{out}");
    }
    Ok(report.accepted)
}

pub fn check_token(issuer_pattern: &str, token: &str, mode: OutputMode) -> anyhow::Result<TokenReport> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

    if credential_shape(token) != CredentialShape::Structured {
        let output = match mode {
            OutputMode::Quiet => None,
            OutputMode::Json => Some(format!(
                "{}\n",
                json!({ "accepted": false, "reason": "not a three-segment token" })
            )),
            OutputMode::Styled => Some(format!(
                "  {} not a three-segment token; opaque credentials are only accepted via remote verification\n",
                style("✗").red().bold()
            )),
        };
        return Ok(TokenReport {
            accepted: false,
            output,
        });
    }

    let verifier = TokenVerifier::new(issuer_pattern)?;
    let claims = decode_claims(token).ok();
    let verdict = verifier.verify(token);

    let output = match mode {
        OutputMode::Quiet => None,
        OutputMode::Json => {
            let value = json!({
                "accepted": verdict.is_ok(),
                "userId": verdict.as_ref().ok(),
                "reason": verdict.as_ref().err().map(|e| e.to_string()),
                "claims": claims.as_ref().map(|c| json!({ "sub": c.sub, "iss": c.iss, "exp": c.exp })),
            });
            Some(format!("{}\n", serde_json::to_string_pretty(&value)?))
        }
        OutputMode::Styled => {
            let mut out = String::new();
            writeln!(out)?;
            if let Some(claims) = &claims {
                write_claims(&mut out, claims)?;
            }
            match &verdict {
                Ok(user_id) => writeln!(
                    out,
                    "  {} accepted as {}",
                    style("✓").green().bold(),
                    style(user_id).cyan()
                )?,
                Err(reason) => writeln!(out, "  {} rejected: {reason}", style("✗").red().bold())?,
            }
            writeln!(out)?;
            Some(out)
        }
    };

    Ok(TokenReport {
        accepted: verdict.is_ok(),
        output,
    })
}

fn write_claims(out: &mut String, claims: &TokenClaims) -> std::fmt::Result {
    writeln!(out, "  {:<8} {}", style("sub").dim(), claims.sub.as_deref().unwrap_or("-"))?;
    writeln!(out, "  {:<8} {}", style("iss").dim(), claims.iss.as_deref().unwrap_or("-"))?;
    let exp = claims
        .exp
        .and_then(|exp| chrono::DateTime::from_timestamp(exp.trunc() as i64, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    writeln!(out, "  {:<8} {}", style("exp").dim(), exp)?;
    writeln!(out)
}
