//! SessionStore trait definition.
//!
//! Every operation takes the verified requester id and enforces ownership
//! itself. Read paths answer "not found" (or empty) for sessions owned by
//! someone else; only `add_message` signals a rejection explicitly, because
//! its only caller is the prompt relay.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use std::future::Future;

use tenantgate_types::error::StoreError;
use tenantgate_types::session::{ConversationMessage, Session};
use uuid::Uuid;

/// Ownership-checked storage for sessions and their message history.
///
/// Implementations: `InMemorySessionStore` (this crate) and
/// `SqliteSessionStore` (tenantgate-infra).
pub trait SessionStore: Send + Sync {
    /// Create an empty session owned by `owner_id`.
    fn create_session(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Get a session if it exists and belongs to `requester_id`.
    fn get_session(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Delete a session and its history if it belongs to `requester_id`.
    ///
    /// Returns whether anything was deleted. Mismatched owners and unknown
    /// ids both yield `false`.
    fn delete_session(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Sessions owned by `requester_id`, newest first.
    fn list_sessions(
        &self,
        requester_id: &str,
    ) -> impl Future<Output = Result<Vec<Session>, StoreError>> + Send;

    /// Append a message to the session's history.
    ///
    /// Fails with [`StoreError::OwnershipRejected`] when the session does not
    /// exist or is not owned by `requester_id`.
    fn add_message(
        &self,
        session_id: &Uuid,
        requester_id: &str,
        message: ConversationMessage,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Ordered history of a session; empty when ownership fails.
    fn get_history(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationMessage>, StoreError>> + Send;
}
