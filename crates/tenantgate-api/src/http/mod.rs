//! HTTP layer for TenantGate.
//!
//! Axum router with bearer-token authentication, flat JSON bodies and
//! CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
