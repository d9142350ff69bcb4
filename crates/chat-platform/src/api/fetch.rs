//! Chat endpoint transport over browser `fetch()` via gloo-net.
//!
//! Same-origin requests carry the auth cookie automatically, so the server
//! sees who is signed in without any token handling here.

use async_trait::async_trait;
use gloo_net::http::Request;

use chat_core::ports::ChatApiPort;
use chat_types::{
    ChatError, Result,
    api::{ChatApiRequest, ChatApiResponse, ErrorBody},
    config::ClientConfig,
};

const FALLBACK_ERROR: &str = "Failed to send message";

pub struct FetchChatApi {
    url: String,
}

impl FetchChatApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            url: config.chat_url(),
        }
    }
}

#[async_trait(?Send)]
impl ChatApiPort for FetchChatApi {
    async fn send(&self, req: &ChatApiRequest) -> Result<ChatApiResponse> {
        let response = Request::post(&self.url)
            .header("Content-Type", "application/json")
            .json(req)
            .map_err(|e| ChatError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &body));
        }

        response
            .json::<ChatApiResponse>()
            .await
            .map_err(|e| ChatError::Protocol(format!("Invalid response from API: {}", e)))
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Map a non-2xx reply to `ChatError::Api`, preferring the server's `error`.
pub fn error_from_body(status: u16, body: &str) -> ChatError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR.to_string());
    log::warn!("Chat API returned HTTP {}: {}", status, message);
    ChatError::Api { status, message }
}
