//! Browser adapters for the chat-core ports.

pub mod api;
pub mod cache;
