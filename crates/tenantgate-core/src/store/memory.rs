//! In-process session store.
//!
//! Sessions live in a `DashMap` keyed by id. Each entry owns its history
//! behind a `tokio::sync::Mutex`, so appends to one session serialize in
//! acceptance order while other sessions proceed untouched. Slots are cloned
//! out of the map (`Arc`) before any `.await`; a `DashMap` guard is never
//! held across a suspension point.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use tenantgate_types::error::StoreError;
use tenantgate_types::session::{ConversationMessage, Session};

use super::repository::SessionStore;

struct SessionSlot {
    session: Session,
    history: Mutex<Vec<ConversationMessage>>,
}

impl SessionSlot {
    async fn snapshot(&self) -> Session {
        let count = self.history.lock().await.len();
        Session {
            message_count: u32::try_from(count).unwrap_or(u32::MAX),
            ..self.session.clone()
        }
    }
}

/// Non-durable [`SessionStore`]; contents are lost on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, Arc<SessionSlot>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a slot and apply the ownership check in one place.
    fn owned_slot(&self, session_id: &Uuid, requester_id: &str) -> Option<Arc<SessionSlot>> {
        self.sessions
            .get(session_id)
            .map(|r| Arc::clone(r.value()))
            .filter(|slot| slot.session.is_owned_by(requester_id))
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, owner_id: &str) -> Result<Session, StoreError> {
        let session = Session::new(owner_id);
        let slot = Arc::new(SessionSlot {
            session: session.clone(),
            history: Mutex::new(Vec::new()),
        });
        self.sessions.insert(session.id, slot);
        tracing::debug!(session_id = %session.id, user_id = owner_id, "session created");
        Ok(session)
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> Result<Option<Session>, StoreError> {
        match self.owned_slot(session_id, requester_id) {
            Some(slot) => Ok(Some(slot.snapshot().await)),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, session_id: &Uuid, requester_id: &str) -> Result<bool, StoreError> {
        // remove_if evaluates the owner check under the shard lock.
        let removed = self
            .sessions
            .remove_if(session_id, |_, slot| slot.session.is_owned_by(requester_id))
            .is_some();
        if removed {
            tracing::debug!(session_id = %session_id, "session deleted");
        }
        Ok(removed)
    }

    async fn list_sessions(&self, requester_id: &str) -> Result<Vec<Session>, StoreError> {
        let owned: Vec<Arc<SessionSlot>> = self
            .sessions
            .iter()
            .filter(|r| r.value().session.is_owned_by(requester_id))
            .map(|r| Arc::clone(r.value()))
            .collect();

        let mut sessions = Vec::with_capacity(owned.len());
        for slot in owned {
            sessions.push(slot.snapshot().await);
        }
        // v7 ids are time-ordered, so they break created_at ties.
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    async fn add_message(
        &self,
        session_id: &Uuid,
        requester_id: &str,
        message: ConversationMessage,
    ) -> Result<(), StoreError> {
        let slot = self
            .owned_slot(session_id, requester_id)
            .ok_or(StoreError::OwnershipRejected)?;
        slot.history.lock().await.push(message);
        Ok(())
    }

    async fn get_history(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> Result<Vec<ConversationMessage>, StoreError> {
        match self.owned_slot(session_id, requester_id) {
            Some(slot) => Ok(slot.history.lock().await.clone()),
            None => Ok(Vec::new()),
        }
    }
}
