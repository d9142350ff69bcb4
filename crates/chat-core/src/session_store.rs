//! Session store: the single source of truth for every chat session the UI
//! can see and for which one is current.
//!
//! Every session mutation serializes the whole list to the durable cache.
//! Opening the store reads that cache once; anything unreadable is treated
//! as a cold start.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::Deserialize;
use chat_types::{
    message::{ChatMessage, DeliveryStatus},
    session::{ChatSession, SessionPhase, SessionStoreState, SessionSummary},
};
use crate::ports::CachePort;

pub struct SessionStore {
    state: SessionStoreState,
    cache: Rc<dyn CachePort>,
    cache_key: String,
    /// Provisional id to the server id it was rotated to, for this page load
    rotated: HashMap<String, String>,
}

/// Older builds cached a bare array of sessions.
#[derive(Deserialize)]
#[serde(untagged)]
enum CachedSessions {
    State(SessionStoreState),
    Legacy(Vec<ChatSession>),
}

impl SessionStore {
    /// Open the store, hydrating from the cache. Never fails.
    pub fn open(cache: Rc<dyn CachePort>, cache_key: impl Into<String>) -> Self {
        let cache_key = cache_key.into();
        let state = hydrate(cache.as_ref(), &cache_key);
        log::info!(
            "Session store opened on {} with {} session(s)",
            cache.backend_name(),
            state.sessions.len()
        );
        Self {
            state,
            cache,
            cache_key,
            rotated: HashMap::new(),
        }
    }

    // ─── Reads ───────────────────────────────────────────────

    pub fn state(&self) -> &SessionStoreState {
        &self.state
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.state.sessions
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.state.session(id)
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.state.current_session_id.as_deref()
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        self.state.current_session()
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.state.sessions.iter().map(ChatSession::summary).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    // ─── Session mutations (persisted) ───────────────────────

    /// Create an empty session at the front of the list and make it current.
    pub fn create_session(&mut self) -> ChatSession {
        let session = ChatSession::new();
        log::debug!("Creating session {}", session.id);
        self.state.current_session_id = Some(session.id.clone());
        self.state.sessions.insert(0, session.clone());
        self.persist();
        session
    }

    /// Append to a session and bump its `updated_at`.
    ///
    /// An unknown id is a no-op: a reply may land after the session was
    /// rotated or deleted.
    pub fn append_message(&mut self, session_id: &str, message: ChatMessage) -> bool {
        match self.state.session_mut(session_id) {
            Some(session) => {
                session.push(message);
                self.persist();
                true
            }
            None => {
                log::warn!("Dropping message for unknown session {}", session_id);
                false
            }
        }
    }

    /// Point the UI at another session. Ids the store does not hold are ignored.
    pub fn set_current_session_id(&mut self, id: &str) -> bool {
        if !self.state.contains(id) {
            log::warn!("Ignoring switch to unknown session {}", id);
            return false;
        }
        self.state.current_session_id = Some(id.to_string());
        self.persist();
        true
    }

    /// Replace a provisional id with the one the server minted.
    ///
    /// Messages move with the session, the current pointer follows it, and the
    /// session becomes committed.
    pub fn rotate_session_id(&mut self, from: &str, to: &str) -> bool {
        if from != to && self.state.contains(to) {
            log::warn!("Cannot rotate {} to {}: id already in use", from, to);
            return false;
        }
        let Some(session) = self.state.session_mut(from) else {
            log::warn!("Cannot rotate unknown session {}", from);
            return false;
        };
        session.id = to.to_string();
        session.phase = SessionPhase::Committed;
        if self.state.current_session_id.as_deref() == Some(from) {
            self.state.current_session_id = Some(to.to_string());
        }
        if from != to {
            self.rotated.insert(from.to_string(), to.to_string());
        }
        self.persist();
        true
    }

    /// The id a session is known by now, following any rotations of `id`.
    pub fn resolve_id(&self, id: &str) -> String {
        let mut current = id;
        let mut seen = HashSet::new();
        while let Some(next) = self.rotated.get(current) {
            if !seen.insert(current) {
                break;
            }
            current = next.as_str();
        }
        current.to_string()
    }

    /// Mark a session's id as confirmed by the server.
    pub fn commit_session(&mut self, session_id: &str) {
        if let Some(session) = self.state.session_mut(session_id) {
            if session.phase != SessionPhase::Committed {
                session.phase = SessionPhase::Committed;
                self.persist();
            }
        }
    }

    /// Settle a pending message. Only `Pending` may change.
    pub fn mark_message(&mut self, session_id: &str, message_id: &str, status: DeliveryStatus) -> bool {
        let Some(message) = self
            .state
            .session_mut(session_id)
            .and_then(|s| s.messages.iter_mut().find(|m| m.id == message_id))
        else {
            return false;
        };
        if !message.status.can_transition_to(status) {
            return false;
        }
        message.status = status;
        self.persist();
        true
    }

    pub fn mark_requires_auth(&mut self, session_id: &str) {
        if let Some(session) = self.state.session_mut(session_id) {
            session.requires_auth = true;
            self.persist();
        }
    }

    pub fn rename_session(&mut self, session_id: &str, name: &str) -> bool {
        let Some(session) = self.state.session_mut(session_id) else {
            return false;
        };
        let name = name.trim();
        session.name = (!name.is_empty()).then(|| name.to_string());
        self.persist();
        true
    }

    /// Remove a session. Deleting the current one moves the pointer to the
    /// first remaining session, or clears it.
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let before = self.state.sessions.len();
        self.state.sessions.retain(|s| s.id != session_id);
        if self.state.sessions.len() == before {
            return false;
        }
        if self.state.current_session_id.as_deref() == Some(session_id) {
            self.state.current_session_id = self.state.sessions.first().map(|s| s.id.clone());
        }
        self.persist();
        true
    }

    // ─── Transient UI state (not persisted) ──────────────────

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.state.error = error;
    }

    // ─── Persistence ─────────────────────────────────────────

    fn persist(&self) {
        let json = match serde_json::to_string(&self.state) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize sessions: {}", e);
                return;
            }
        };
        if let Err(e) = self.cache.write(&self.cache_key, &json) {
            log::warn!("Failed to persist sessions to {}: {}", self.cache.backend_name(), e);
        }
    }
}

fn hydrate(cache: &dyn CachePort, key: &str) -> SessionStoreState {
    let raw = match cache.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return SessionStoreState::default(),
        Err(e) => {
            log::warn!("Session cache unreadable, starting cold: {}", e);
            return SessionStoreState::default();
        }
    };

    let mut state = match serde_json::from_str::<CachedSessions>(&raw) {
        Ok(CachedSessions::State(state)) => state,
        Ok(CachedSessions::Legacy(sessions)) => SessionStoreState {
            sessions,
            ..Default::default()
        },
        Err(e) => {
            log::warn!("Session cache corrupt, starting cold: {}", e);
            return SessionStoreState::default();
        }
    };

    let mut seen = HashSet::new();
    state.sessions.retain(|s| seen.insert(s.id.clone()));
    if let Some(current) = state.current_session_id.as_deref() {
        if !state.contains(current) {
            state.current_session_id = None;
        }
    }
    state
}
