//! Server-side port traits.
//!
//! Unlike the browser ports these are `Send + Sync`: axum shares them
//! across worker threads behind `Arc`.

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Serialize;

use chat_types::{
    Result,
    message::StoredMessage,
    session::StoredChat,
};

// ─── Model Port ──────────────────────────────────────────────

/// External generative-text service.
#[async_trait]
pub trait ModelPort: Send + Sync {
    /// Continue `history` with the user's `message` and return the reply text.
    async fn generate(&self, history: &[StoredMessage], message: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

// ─── History Store Port ──────────────────────────────────────

/// Per-user chat history in an external document store.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch `users/{user}/chats/{session}`, creating an empty document if missing.
    async fn load_or_create(&self, user_id: &str, session_id: &str) -> Result<StoredChat>;

    /// Additive write: messages already present are left as they are.
    async fn append(&self, user_id: &str, session_id: &str, messages: &[StoredMessage]) -> Result<()>;

    /// Connectivity and layout check for the debug endpoint.
    async fn check(&self) -> Result<SchemaReport>;

    fn backend_name(&self) -> &str;
}

/// What the schema check found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    pub backend: String,
    pub users: usize,
    pub sample_user: Option<String>,
    pub chats: usize,
    pub sample_chat_messages: Option<usize>,
}

// ─── Identity Port ───────────────────────────────────────────

/// Resolves the signed-in user from request headers.
#[async_trait]
pub trait IdentityPort: Send + Sync {
    /// `None` means anonymous. Lookup failures are anonymous too.
    async fn identify(&self, headers: &HeaderMap) -> Option<String>;
}

// ─── Quota Counter Port ──────────────────────────────────────

/// Atomic per-key counter. The in-process map can be swapped for a shared
/// counter service when the server runs as more than one process.
#[async_trait]
pub trait QuotaCounter: Send + Sync {
    /// Add one and return the new value. The first call for a key returns 1.
    async fn increment(&self, key: &str) -> Result<u64>;

    async fn get(&self, key: &str) -> Result<u64>;
}
