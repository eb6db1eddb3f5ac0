//! Infrastructure layer for TenantGate.
//!
//! Contains implementations of the traits defined in `tenantgate-core`:
//! the SQLite session store, the OpenAI-compatible upstream client and the
//! identity provider client. Also owns configuration loading.

pub mod config;
pub mod identity;
pub mod llm;
pub mod sqlite;
pub mod store;
