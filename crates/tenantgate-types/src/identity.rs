//! Verified identity types.
//!
//! The gateway knows nothing about a user beyond the opaque identifier
//! extracted from a verified bearer credential.

use serde::{Deserialize, Serialize};

use std::fmt;

/// How a credential was verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Three-segment token decoded locally (claims checked, signature not).
    LocalClaims,
    /// Opaque credential confirmed by the identity provider's backend.
    Remote,
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationMethod::LocalClaims => write!(f, "local_claims"),
            VerificationMethod::Remote => write!(f, "remote"),
        }
    }
}

/// A user identity extracted from a verified credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    pub user_id: String,
    pub method: VerificationMethod,
}

/// Claims read from the payload segment of a bearer token.
///
/// Every field is optional on the wire; the verifier decides which absences
/// are fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    /// Expiry as a NumericDate: seconds since the Unix epoch, possibly
    /// fractional.
    #[serde(default)]
    pub exp: Option<f64>,
}
