//! SQLite session store implementation.
//!
//! Implements `SessionStore` from `tenantgate-core` using sqlx with split
//! read/write pools. Ownership is part of every WHERE clause, so a foreign
//! session is indistinguishable from a missing one at the SQL level. Message
//! order is the AUTOINCREMENT id; history deletion rides on
//! `ON DELETE CASCADE`.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use tenantgate_core::store::repository::SessionStore;
use tenantgate_types::error::{RepositoryError, StoreError};
use tenantgate_types::session::{ConversationMessage, MessageRole, Session};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = r#"s.id, s.owner_id, s.created_at,
       (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id) AS message_count"#;

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    owner_id: String,
    created_at: String,
    message_count: i64,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
            message_count: row.try_get("message_count")?,
        })
    }

    fn into_session(self) -> Result<Session, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;

        Ok(Session {
            id,
            user_id: self.owner_id,
            created_at: parse_datetime(&self.created_at)?,
            message_count: u32::try_from(self.message_count.max(0)).unwrap_or(u32::MAX),
        })
    }
}

struct MessageRow {
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ConversationMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ConversationMessage {
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width so that `ORDER BY created_at` sorts chronologically.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_err(e: sqlx::Error) -> StoreError {
    RepositoryError::Query(e.to_string()).into()
}

fn map_sessions(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Session>, StoreError> {
    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        let session_row = SessionRow::from_row(row).map_err(query_err)?;
        sessions.push(session_row.into_session()?);
    }
    Ok(sessions)
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteSessionStore {
    async fn create_session(&self, owner_id: &str) -> Result<Session, StoreError> {
        let session = Session::new(owner_id);

        sqlx::query("INSERT INTO sessions (id, owner_id, created_at) VALUES (?, ?, ?)")
            .bind(session.id.to_string())
            .bind(&session.user_id)
            .bind(format_datetime(&session.created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        tracing::debug!(session_id = %session.id, user_id = owner_id, "session created");
        Ok(session)
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> Result<Option<Session>, StoreError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions s WHERE s.id = ? AND s.owner_id = ?");
        let row = sqlx::query(&sql)
            .bind(session_id.to_string())
            .bind(requester_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let session_row = SessionRow::from_row(&row).map_err(query_err)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, session_id: &Uuid, requester_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ? AND owner_id = ?")
            .bind(session_id.to_string())
            .bind(requester_id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(session_id = %session_id, "session deleted");
        }
        Ok(deleted)
    }

    async fn list_sessions(&self, requester_id: &str) -> Result<Vec<Session>, StoreError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions s WHERE s.owner_id = ? ORDER BY s.created_at DESC, s.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(requester_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        map_sessions(&rows)
    }

    async fn add_message(
        &self,
        session_id: &Uuid,
        requester_id: &str,
        message: ConversationMessage,
    ) -> Result<(), StoreError> {
        // Ownership check and insert in one statement: no window between them.
        let result = sqlx::query(
            r#"INSERT INTO messages (session_id, role, content, created_at)
               SELECT id, ?, ?, ? FROM sessions WHERE id = ? AND owner_id = ?"#,
        )
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .bind(session_id.to_string())
        .bind(requester_id)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OwnershipRejected);
        }
        Ok(())
    }

    async fn get_history(
        &self,
        session_id: &Uuid,
        requester_id: &str,
    ) -> Result<Vec<ConversationMessage>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT m.role, m.content, m.created_at
               FROM messages m
               JOIN sessions s ON s.id = m.session_id
               WHERE m.session_id = ? AND s.owner_id = ?
               ORDER BY m.id ASC"#,
        )
        .bind(session_id.to_string())
        .bind(requester_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(query_err)?;
            messages.push(msg_row.into_message()?);
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (tempfile::TempDir, SqliteSessionStore, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sessions.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteSessionStore::new(pool.clone()), pool)
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (_dir, store, _pool) = test_store().await;

        let session = store.create_session("user-1").await.unwrap();
        let found = store.get_session(&session.id, "user-1").await.unwrap().unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.user_id, "user-1");
        assert_eq!(found.message_count, 0);
        assert_eq!(
            found.created_at.timestamp_micros(),
            session.created_at.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn test_ownership_isolation() {
        let (_dir, store, _pool) = test_store().await;

        let session = store.create_session("user-1").await.unwrap();
        store
            .add_message(&session.id, "user-1", ConversationMessage::user("private"))
            .await
            .unwrap();

        assert!(store.get_session(&session.id, "user-2").await.unwrap().is_none());
        assert!(!store.delete_session(&session.id, "user-2").await.unwrap());
        assert!(store.get_history(&session.id, "user-2").await.unwrap().is_empty());
        assert!(store.list_sessions("user-2").await.unwrap().is_empty());
        assert!(matches!(
            store
                .add_message(&session.id, "user-2", ConversationMessage::user("x"))
                .await,
            Err(StoreError::OwnershipRejected)
        ));

        let history = store.get_history(&session.id, "user-1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "private");
    }

    #[tokio::test]
    async fn test_delete_session_cascades_messages() {
        let (_dir, store, pool) = test_store().await;

        let session = store.create_session("user-1").await.unwrap();
        store
            .add_message(&session.id, "user-1", ConversationMessage::user("Hello"))
            .await
            .unwrap();

        assert!(store.delete_session(&session.id, "user-1").await.unwrap());
        assert!(!store.delete_session(&session.id, "user-1").await.unwrap());
        assert!(store.get_session(&session.id, "user-1").await.unwrap().is_none());

        let (orphans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE session_id = ?")
            .bind(session.id.to_string())
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_session_is_false() {
        let (_dir, store, _pool) = test_store().await;
        assert!(!store.delete_session(&Uuid::now_v7(), "user-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first_with_counts() {
        let (_dir, store, _pool) = test_store().await;

        let first = store.create_session("user-1").await.unwrap();
        let second = store.create_session("user-1").await.unwrap();
        store.create_session("user-2").await.unwrap();
        store
            .add_message(&first.id, "user-1", ConversationMessage::user("a"))
            .await
            .unwrap();

        let listed = store.list_sessions("user-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[1].message_count, 1);
    }

    #[tokio::test]
    async fn test_history_order_follows_acceptance() {
        let (_dir, store, _pool) = test_store().await;

        let session = store.create_session("user-1").await.unwrap();
        for (i, role) in [MessageRole::User, MessageRole::Assistant, MessageRole::User]
            .into_iter()
            .enumerate()
        {
            store
                .add_message(&session.id, "user-1", ConversationMessage::new(role, format!("m{i}")))
                .await
                .unwrap();
        }

        let history = store.get_history(&session.id, "user-1").await.unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2"]);
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_persist() {
        let (_dir, store, pool) = test_store().await;
        let store = std::sync::Arc::new(store);
        let session = store.create_session("user-1").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = std::sync::Arc::clone(&store);
            let id = session.id;
            handles.push(tokio::spawn(async move {
                store
                    .add_message(&id, "user-1", ConversationMessage::user(format!("m{i}")))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let history = store.get_history(&session.id, "user-1").await.unwrap();
        assert_eq!(history.len(), 20);

        // History follows acceptance order, which is the messages.id order.
        let accepted: Vec<(String,)> =
            sqlx::query_as("SELECT content FROM messages WHERE session_id = ? ORDER BY id ASC")
                .bind(session.id.to_string())
                .fetch_all(&pool.reader)
                .await
                .unwrap();
        let accepted: Vec<String> = accepted.into_iter().map(|(c,)| c).collect();
        let returned: Vec<String> = history.into_iter().map(|m| m.content).collect();
        assert_eq!(returned, accepted);
    }

    #[test]
    fn test_message_count_saturates() {
        let row = SessionRow {
            id: Uuid::now_v7().to_string(),
            owner_id: "user-1".to_string(),
            created_at: format_datetime(&Utc::now()),
            message_count: i64::from(u32::MAX) + 1,
        };
        assert_eq!(row.into_session().unwrap().message_count, u32::MAX);
    }
}
