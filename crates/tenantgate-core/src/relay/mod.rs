//! Prompt relay: the only path that writes conversation history.

pub mod service;
