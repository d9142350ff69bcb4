//! Id and clock helpers shared by the client and the server.

use uuid::Uuid;

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub const SESSION_ID_MAX_LEN: usize = 128;

/// Generate an opaque unique id: epoch millis followed by a random suffix.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", now_millis(), &suffix[..12])
}

/// Session id minted by the server when a request arrives without one.
pub fn server_session_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("chat_{}_{}", now_millis(), &suffix[..8])
}

/// Session ids are 1 to 128 ASCII letters, digits, `_` or `-`.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= SESSION_ID_MAX_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
