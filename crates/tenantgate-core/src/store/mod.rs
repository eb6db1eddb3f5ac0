//! Session storage port and the in-process implementation.
//!
//! The durable SQLite implementation lives in tenantgate-infra.

pub mod box_store;
pub mod memory;
pub mod repository;
