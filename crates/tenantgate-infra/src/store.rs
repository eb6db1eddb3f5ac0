//! Session store factory.

use anyhow::Context;

use tenantgate_core::store::box_store::BoxSessionStore;
use tenantgate_core::store::memory::InMemorySessionStore;
use tenantgate_types::config::{StorageBackend, StorageConfig};

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::session::SqliteSessionStore;

/// Build the session store selected by `storage.backend`.
pub async fn create_session_store(storage: &StorageConfig) -> anyhow::Result<BoxSessionStore> {
    let store = match storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory session store; sessions are lost on restart");
            BoxSessionStore::new(InMemorySessionStore::new(), "memory")
        }
        StorageBackend::Sqlite => {
            let pool = DatabasePool::new(&storage.database_url)
                .await
                .with_context(|| format!("failed to open database {}", storage.database_url))?;
            BoxSessionStore::new(SqliteSessionStore::new(pool), "sqlite")
        }
    };

    tracing::info!(backend = store.backend(), "session store ready");
    Ok(store)
}
