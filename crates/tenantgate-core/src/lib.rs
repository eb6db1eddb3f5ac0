//! Core logic and port definitions for TenantGate.
//!
//! This crate holds the token verifier, the `SessionStore` and `LlmProvider`
//! traits, the in-memory store, and the prompt relay. It depends only on
//! `tenantgate-types` -- never on `tenantgate-infra` or any database/IO crate.

pub mod auth;
pub mod llm;
pub mod relay;
pub mod store;
