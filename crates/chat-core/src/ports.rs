//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use chat_types::{
    Result,
    api::{ChatApiRequest, ChatApiResponse},
};

// ─── Chat API Port ───────────────────────────────────────────

/// Transport to the chat endpoint.
///
/// A 2xx reply decodes into [`ChatApiResponse`]; a non-2xx reply becomes
/// `ChatError::Api` carrying the server's `error` message.
#[async_trait(?Send)]
pub trait ChatApiPort {
    async fn send(&self, req: &ChatApiRequest) -> Result<ChatApiResponse>;

    /// Where requests go (for logging/debug)
    fn endpoint(&self) -> &str;
}

// ─── Durable Cache Port ──────────────────────────────────────

/// Synchronous key/value cache that survives page reloads, shaped after
/// browser `localStorage`.
pub trait CachePort {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
