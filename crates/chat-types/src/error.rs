use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Missing or empty message
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing upstream credentials or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model service or the document store failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx reply from the chat endpoint
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A reply that fits no branch of the chat protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// HTTP status the server reports this error with.
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::Validation(_) => 400,
            ChatError::Api { status, .. } => *status,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}
