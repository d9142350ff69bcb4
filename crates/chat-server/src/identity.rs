//! Identity adapters.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use reqwest::Client;
use serde_json::Value;

use crate::ports::IdentityPort;

/// Every caller is anonymous. Used when no session endpoint is configured.
pub struct AnonymousIdentity;

#[async_trait]
impl IdentityPort for AnonymousIdentity {
    async fn identify(&self, _headers: &HeaderMap) -> Option<String> {
        None
    }
}

/// Asks an external session endpoint who the caller is, forwarding the
/// request's `cookie` and `authorization` headers.
///
/// The endpoint answers with `{ "user": { "id": .. } }` or a token body with
/// `sub`; anything else counts as anonymous.
pub struct RemoteSessionIdentity {
    client: Client,
    url: String,
}

impl RemoteSessionIdentity {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl IdentityPort for RemoteSessionIdentity {
    async fn identify(&self, headers: &HeaderMap) -> Option<String> {
        let cookie = headers.get(header::COOKIE);
        let authorization = headers.get(header::AUTHORIZATION);
        if cookie.is_none() && authorization.is_none() {
            return None;
        }

        let mut request = self.client.get(&self.url);
        if let Some(cookie) = cookie.and_then(|v| v.to_str().ok()) {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(auth) = authorization.and_then(|v| v.to_str().ok()) {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = match request.send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::debug!("Session endpoint answered HTTP {}", r.status());
                return None;
            }
            Err(e) => {
                log::warn!("Error checking authentication: {}", e);
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(body) => user_id_from_session(&body),
            Err(e) => {
                log::warn!("Unreadable session body: {}", e);
                None
            }
        }
    }
}

/// Pull the user id out of a session or token body.
pub(crate) fn user_id_from_session(body: &Value) -> Option<String> {
    body["user"]["id"]
        .as_str()
        .or_else(|| body["sub"].as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
