use serde::{Deserialize, Serialize};
use crate::api::DemoQuota;

/// Events emitted by the chat client.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A request for this session went out
    RequestStart { session_id: String },

    /// The server replaced a provisional id with its own
    SessionRotated { from: String, to: String },

    /// A model reply was appended
    ReplyReceived { session_id: String, message_id: String },

    /// Demo counters changed
    QuotaUpdated { quota: DemoQuota },

    /// Demo ceiling hit; the user must sign in
    AuthRequired { session_id: String },

    /// Sending is disabled service-wide
    Paused,

    /// The request finished, successfully or not
    RequestEnd { session_id: String },

    /// An error occurred
    Error { message: String },
}
