//! BoxSessionStore -- object-safe dynamic dispatch wrapper for SessionStore.
//!
//! Lets the gateway pick the in-memory or SQLite backend from configuration
//! at startup. `BoxSessionStore` itself implements [`SessionStore`], so
//! services generic over the trait accept it unchanged.

use std::future::Future;
use std::pin::Pin;

use tenantgate_types::error::StoreError;
use tenantgate_types::session::{ConversationMessage, Session};
use uuid::Uuid;

use super::repository::SessionStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Object-safe version of [`SessionStore`] with boxed futures.
pub trait SessionStoreDyn: Send + Sync {
    fn create_session_boxed<'a>(&'a self, owner_id: &'a str) -> BoxFuture<'a, Session>;

    fn get_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
    ) -> BoxFuture<'a, Option<Session>>;

    fn delete_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
    ) -> BoxFuture<'a, bool>;

    fn list_sessions_boxed<'a>(&'a self, requester_id: &'a str) -> BoxFuture<'a, Vec<Session>>;

    fn add_message_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
        message: ConversationMessage,
    ) -> BoxFuture<'a, ()>;

    fn get_history_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
    ) -> BoxFuture<'a, Vec<ConversationMessage>>;
}

impl<T: SessionStore> SessionStoreDyn for T {
    fn create_session_boxed<'a>(&'a self, owner_id: &'a str) -> BoxFuture<'a, Session> {
        Box::pin(self.create_session(owner_id))
    }

    fn get_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
    ) -> BoxFuture<'a, Option<Session>> {
        Box::pin(self.get_session(session_id, requester_id))
    }

    fn delete_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
    ) -> BoxFuture<'a, bool> {
        Box::pin(self.delete_session(session_id, requester_id))
    }

    fn list_sessions_boxed<'a>(&'a self, requester_id: &'a str) -> BoxFuture<'a, Vec<Session>> {
        Box::pin(self.list_sessions(requester_id))
    }

    fn add_message_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
        message: ConversationMessage,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.add_message(session_id, requester_id, message))
    }

    fn get_history_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
        requester_id: &'a str,
    ) -> BoxFuture<'a, Vec<ConversationMessage>> {
        Box::pin(self.get_history(session_id, requester_id))
    }
}

/// Type-erased session store for runtime backend selection.
pub struct BoxSessionStore {
    inner: Box<dyn SessionStoreDyn + Send + Sync>,
    backend: &'static str,
}

impl BoxSessionStore {
    /// Wrap a concrete store, tagging it with a backend name for logs.
    pub fn new<T: SessionStore + 'static>(store: T, backend: &'static str) -> Self {
        Self {
            inner: Box::new(store),
            backend,
        }
    }

    /// Name of the wrapped backend (e.g., "memory", "sqlite").
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

impl SessionStore for BoxSessionStore {
    async fn create_session(&self, owner_id: &str) -> Result<Session, StoreError> {
        self.inner.create_session_boxed(owner_id).await
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> Result<Option<Session>, StoreError> {
        self.inner.get_session_boxed(session_id, requester_id).await
    }

    async fn delete_session(&self, session_id: &Uuid, requester_id: &str) -> Result<bool, StoreError> {
        self.inner.delete_session_boxed(session_id, requester_id).await
    }

    async fn list_sessions(&self, requester_id: &str) -> Result<Vec<Session>, StoreError> {
        self.inner.list_sessions_boxed(requester_id).await
    }

    async fn add_message(
        &self,
        session_id: &Uuid,
        requester_id: &str,
        message: ConversationMessage,
    ) -> Result<(), StoreError> {
        self.inner
            .add_message_boxed(session_id, requester_id, message)
            .await
    }

    async fn get_history(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> Result<Vec<ConversationMessage>, StoreError> {
        self.inner.get_history_boxed(session_id, requester_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemorySessionStore;

    #[tokio::test]
    async fn test_boxed_store_delegates() {
        let store = BoxSessionStore::new(InMemorySessionStore::new(), "memory");
        assert_eq!(store.backend(), "memory");

        let session = store.create_session("user-1").await.unwrap();
        store
            .add_message(&session.id, "user-1", ConversationMessage::user("hi"))
            .await
            .unwrap();

        let history = store.get_history(&session.id, "user-1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(store.delete_session(&session.id, "user-1").await.unwrap());
        assert!(store.list_sessions("user-1").await.unwrap().is_empty());
    }
}
