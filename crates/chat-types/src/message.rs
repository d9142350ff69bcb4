use serde::{Deserialize, Serialize};
use crate::ids::{generate_id, now_millis};

/// Author of a message. The model service only knows these two turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Delivery state of a message in the local store.
///
/// User messages start `Pending` (optimistic append) and settle to
/// `Confirmed` or `Failed` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    #[default]
    Confirmed,
    Failed,
}

impl DeliveryStatus {
    /// Only a pending message may change state.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        self == DeliveryStatus::Pending && next != DeliveryStatus::Pending
    }
}

/// A single message in a chat session. Content never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default)]
    pub status: DeliveryStatus,
}

impl ChatMessage {
    /// A user message awaiting server confirmation.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role: Role::User,
            content: content.into(),
            timestamp: now_millis(),
            status: DeliveryStatus::Pending,
        }
    }

    /// A model reply; replies only exist once the server produced them.
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role: Role::Model,
            content: content.into(),
            timestamp: now_millis(),
            status: DeliveryStatus::Confirmed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == DeliveryStatus::Pending
    }
}

/// Message shape persisted in the external document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl StoredMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: now_millis(),
        }
    }
}

impl From<&ChatMessage> for StoredMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
            timestamp: msg.timestamp,
        }
    }
}
