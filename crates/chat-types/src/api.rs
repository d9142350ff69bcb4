//! Wire protocol of `POST /api/chat`.
//!
//! The JSON reply is a flat object whose meaning depends on which fields are
//! present. [`ChatApiResponse::classify`] turns it into the tagged
//! [`ChatReply`] so callers never branch on field presence themselves.

use serde::{Deserialize, Serialize};
use crate::{ChatError, Result};

pub const SESSION_CREATED: &str = "Session created";

pub const DEMO_LIMIT_ADVISORY: &str = "You've reached the demo message limit. \
Please sign in to continue chatting and save your conversation history.";

/// Request body. A missing `sessionId` asks the server to provision one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatApiRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl ChatApiRequest {
    pub fn new(session_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            session_id,
            message: message.into(),
        }
    }
}

/// Demo-mode counters carried by a reply. Advisory on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoQuota {
    pub demo_mode: bool,
    pub message_count: u32,
    pub message_limit: u32,
}

impl DemoQuota {
    pub fn exhausted(&self) -> bool {
        self.demo_mode && self.message_count >= self.message_limit
    }
}

/// Successful (2xx) reply body, exactly as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_limit: Option<u32>,
}

impl ChatApiResponse {
    /// Phase-1 handshake reply: the server minted `session_id`, no model call.
    pub fn session_created(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            message: Some(SESSION_CREATED.to_string()),
            ..Default::default()
        }
    }

    /// Demo ceiling exceeded.
    pub fn auth_required(quota: DemoQuota, advisory: impl Into<String>) -> Self {
        Self {
            response: Some(advisory.into()),
            require_auth: true,
            ..Default::default()
        }
        .with_quota(quota)
    }

    pub fn answer(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            response: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_quota(mut self, quota: DemoQuota) -> Self {
        self.demo_mode = Some(quota.demo_mode);
        self.message_count = Some(quota.message_count);
        self.message_limit = Some(quota.message_limit);
        self
    }

    /// Demo counters, if the reply carries any of them.
    pub fn quota(&self) -> Option<DemoQuota> {
        if self.demo_mode.is_none() && self.message_count.is_none() && self.message_limit.is_none() {
            return None;
        }
        Some(DemoQuota {
            demo_mode: self.demo_mode.unwrap_or(false),
            message_count: self.message_count.unwrap_or(0),
            message_limit: self.message_limit.unwrap_or(0),
        })
    }

    /// Classify the reply, in protocol priority order.
    pub fn classify(self) -> Result<ChatReply> {
        let quota = self.quota();

        if self.require_auth {
            return Ok(ChatReply::AuthRequired {
                advisory: self.response.unwrap_or_else(|| DEMO_LIMIT_ADVISORY.to_string()),
                quota,
            });
        }

        if self.message.as_deref() == Some(SESSION_CREATED) {
            return match self.session_id {
                Some(session_id) => Ok(ChatReply::SessionCreated { session_id, quota }),
                None => Err(ChatError::Protocol(
                    "session created without a session id".to_string(),
                )),
            };
        }

        match (self.response, self.message) {
            (Some(text), _) => Ok(ChatReply::Answer {
                session_id: self.session_id,
                text,
                quota,
            }),
            (None, Some(other)) => Err(ChatError::Protocol(format!(
                "unexpected reply without answer: {}",
                other
            ))),
            (None, None) => Err(ChatError::Protocol("Invalid response from API".to_string())),
        }
    }
}

/// A classified reply from the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Demo ceiling hit; `advisory` is shown as a model message.
    AuthRequired {
        advisory: String,
        quota: Option<DemoQuota>,
    },
    /// The server minted a fresh id; the client must rotate and resend once.
    SessionCreated {
        session_id: String,
        quota: Option<DemoQuota>,
    },
    /// A normal model answer.
    Answer {
        session_id: Option<String>,
        text: String,
        quota: Option<DemoQuota>,
    },
}

/// Error body sent with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}
