//! Local bearer-token verification.
//!
//! Decodes the payload segment of a three-segment token and checks expiry,
//! issuer, and subject. The signature segment is NOT validated: this path
//! trusts whoever minted a well-formed token for a matching issuer. Opaque
//! credentials are handed to a [`super::remote::RemoteVerifier`] instead.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use regex::Regex;

use tenantgate_types::error::AuthFailure;
use tenantgate_types::identity::TokenClaims;

/// Authorization scheme prefix, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Shape of a credential, decided before any decoding happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialShape {
    /// Exactly three dot-separated segments.
    Structured,
    /// No dots at all: an opaque session id or ticket.
    Opaque,
    /// Has dots but not three segments.
    Malformed,
}

/// Classify a raw credential by its segment count.
pub fn credential_shape(credential: &str) -> CredentialShape {
    match credential.split('.').count() {
        3 => CredentialShape::Structured,
        1 => CredentialShape::Opaque,
        _ => CredentialShape::Malformed,
    }
}

/// Extract the credential from an `Authorization` header value.
///
/// Returns [`AuthFailure::Missing`] when the header is absent, uses another
/// scheme, or carries an empty credential.
pub fn bearer_credential(header: Option<&str>) -> Result<&str, AuthFailure> {
    let credential = header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(AuthFailure::Missing)?;

    if credential.is_empty() {
        return Err(AuthFailure::Missing);
    }
    Ok(credential)
}

/// Decode the claims of a three-segment credential without checking them.
pub fn decode_claims(credential: &str) -> Result<TokenClaims, AuthFailure> {
    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthFailure::Malformed);
    }

    // Padding is optional on the wire; the engine wants none.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthFailure::Malformed)?;

    serde_json::from_slice(&bytes).map_err(|_| AuthFailure::Malformed)
}

/// Verifies structured bearer tokens against an issuer pattern.
///
/// Built once at startup from configuration and shared read-only.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    issuer: Regex,
}

impl TokenVerifier {
    /// Compile the issuer pattern.
    pub fn new(issuer_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            issuer: Regex::new(issuer_pattern)?,
        })
    }

    /// Verify a credential against the current wall-clock time.
    pub fn verify(&self, credential: &str) -> Result<String, AuthFailure> {
        self.verify_at(credential, Utc::now().timestamp())
    }

    /// Verify a credential as of `now` (seconds since the Unix epoch).
    ///
    /// Checks run in a fixed order: shape, decode, expiry, issuer, subject.
    /// A token with `exp == now` is already expired. A token with no `exp`
    /// is treated as expired.
    pub fn verify_at(&self, credential: &str, now: i64) -> Result<String, AuthFailure> {
        let claims = decode_claims(credential)?;

        match claims.exp {
            Some(exp) if exp > now as f64 => {}
            _ => return Err(AuthFailure::Expired),
        }

        let issuer = claims.iss.as_deref().unwrap_or_default();
        if !self.issuer.is_match(issuer) {
            return Err(AuthFailure::UntrustedIssuer);
        }

        match claims.sub {
            Some(sub) if !sub.trim().is_empty() => Ok(sub),
            _ => Err(AuthFailure::NoSubject),
        }
    }
}
