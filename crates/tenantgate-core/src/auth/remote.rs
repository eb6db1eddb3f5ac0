//! RemoteVerifier trait and its type-erased wrapper.
//!
//! The identity provider's backend is the authority for credentials that
//! are not three-segment tokens (opaque session ids, one-time sign-in
//! tickets). Implementations live in tenantgate-infra.
//!
//! `BoxRemoteVerifier` follows the same blanket-impl pattern as
//! `BoxLlmProvider`:
//! 1. Define an object-safe `RemoteVerifierDyn` trait with boxed futures
//! 2. Blanket-impl `RemoteVerifierDyn` for all `T: RemoteVerifier`
//! 3. `BoxRemoteVerifier` wraps `Box<dyn RemoteVerifierDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use tenantgate_types::error::IdentityError;

/// Backend verification against the identity provider.
pub trait RemoteVerifier: Send + Sync {
    /// Confirm an opaque session credential and return its user id.
    fn verify_session(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<String, IdentityError>> + Send;

    /// Redeem a one-time sign-in ticket and return the signed-in user id.
    fn exchange_ticket(
        &self,
        ticket: &str,
    ) -> impl Future<Output = Result<String, IdentityError>> + Send;
}

/// Object-safe version of [`RemoteVerifier`] with boxed futures.
pub trait RemoteVerifierDyn: Send + Sync {
    fn verify_session_boxed<'a>(
        &'a self,
        credential: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, IdentityError>> + Send + 'a>>;

    fn exchange_ticket_boxed<'a>(
        &'a self,
        ticket: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, IdentityError>> + Send + 'a>>;
}

impl<T: RemoteVerifier> RemoteVerifierDyn for T {
    fn verify_session_boxed<'a>(
        &'a self,
        credential: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, IdentityError>> + Send + 'a>> {
        Box::pin(self.verify_session(credential))
    }

    fn exchange_ticket_boxed<'a>(
        &'a self,
        ticket: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, IdentityError>> + Send + 'a>> {
        Box::pin(self.exchange_ticket(ticket))
    }
}

/// Type-erased remote verifier, so the concrete identity-provider client
/// (or a test stub) can be chosen at startup.
pub struct BoxRemoteVerifier {
    inner: Box<dyn RemoteVerifierDyn + Send + Sync>,
}

impl BoxRemoteVerifier {
    pub fn new<T: RemoteVerifier + 'static>(verifier: T) -> Self {
        Self {
            inner: Box::new(verifier),
        }
    }
}

impl RemoteVerifier for BoxRemoteVerifier {
    async fn verify_session(&self, credential: &str) -> Result<String, IdentityError> {
        self.inner.verify_session_boxed(credential).await
    }

    async fn exchange_ticket(&self, ticket: &str) -> Result<String, IdentityError> {
        self.inner.exchange_ticket_boxed(ticket).await
    }
}
