use serde::{Deserialize, Serialize};
use crate::ids::{generate_id, now_millis};
use crate::message::{ChatMessage, Role};

const TITLE_MAX_CHARS: usize = 30;
const DEFAULT_TITLE: &str = "New Chat";

/// Whether the server has confirmed this session's id.
///
/// A provisional session is sent without an id so the server mints one;
/// the "Session created" reply rotates it to the server id and commits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Provisional,
    Committed,
}

/// A conversation thread. Messages are append-only in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub phase: SessionPhase,
    /// Set once the demo ceiling was hit for this session
    #[serde(default)]
    pub requires_auth: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_id(generate_id())
    }

    pub fn with_id(id: String) -> Self {
        let now = now_millis();
        Self {
            id,
            name: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            phase: SessionPhase::Provisional,
            requires_auth: false,
        }
    }

    /// Bump `updated_at`, strictly increasing even within one millisecond.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at + 1);
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.touch();
    }

    pub fn is_committed(&self) -> bool {
        self.phase == SessionPhase::Committed
    }

    /// Display title: explicit name, else the start of the first user message.
    pub fn title(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.trim().chars().take(TITLE_MAX_CHARS).collect())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title(),
            updated_at: self.updated_at,
            message_count: self.messages.len(),
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a session for the sidebar list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
    pub message_count: usize,
}

/// Everything the session store owns. `loading` and `error` are transient
/// and never written to the durable cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStoreState {
    pub sessions: Vec<ChatSession>,
    #[serde(default)]
    pub current_session_id: Option<String>,
    #[serde(skip)]
    pub loading: bool,
    #[serde(skip)]
    pub error: Option<String>,
}

impl SessionStoreState {
    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn session_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.session(id).is_some()
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.session(id))
    }
}

/// Per-session document in the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredChat {
    pub created_at: i64,
    pub updated_at: i64,
    pub messages: Vec<crate::message::StoredMessage>,
}

impl StoredChat {
    pub fn empty() -> Self {
        let now = now_millis();
        Self {
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }
}
