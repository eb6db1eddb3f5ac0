//! Shared domain types for TenantGate.
//!
//! Sessions, conversation messages, verified identities, upstream completion
//! shapes, gateway configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod session;
