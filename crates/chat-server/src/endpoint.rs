//! `POST /api/chat` orchestration, independent of HTTP.
//!
//! Per request:
//! 1. Validate the body (400 when the message is missing)
//! 2. No session id: mint one and answer "Session created", nothing else;
//!    an id outside `[A-Za-z0-9_-]{1,128}` is a 400
//! 3. Anonymous callers: count the message, stop with the sign-in advisory
//!    once the demo limit is passed (no model call, nothing persisted)
//! 4. Load history (signed-in users only)
//! 5. Ask the model
//! 6. Persist both messages (signed-in users only)
//! 7. Respond, with demo counters for anonymous callers

use std::sync::Arc;

use chat_types::{
    ChatError, Result,
    api::{ChatApiRequest, ChatApiResponse, DEMO_LIMIT_ADVISORY},
    ids::{is_valid_session_id, server_session_id},
    message::{Role, StoredMessage},
};
use crate::ports::{HistoryStore, ModelPort};
use crate::quota::QuotaTracker;

pub struct ChatEndpoint {
    quota: QuotaTracker,
    model: Arc<dyn ModelPort>,
    history: Arc<dyn HistoryStore>,
}

impl ChatEndpoint {
    pub fn new(quota: QuotaTracker, model: Arc<dyn ModelPort>, history: Arc<dyn HistoryStore>) -> Self {
        Self { quota, model, history }
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Handle one chat request for `user_id` (`None` when anonymous).
    pub async fn handle(&self, user_id: Option<&str>, request: ChatApiRequest) -> Result<ChatApiResponse> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::Validation("Message is required".to_string()));
        }

        let session_id = match request.session_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) if is_valid_session_id(id) => id.to_string(),
            Some(id) => {
                log::warn!("Rejected malformed session id {:?}", id);
                return Err(ChatError::Validation("Invalid session id".to_string()));
            }
            None => return self.provision(user_id).await,
        };

        let mut quota = None;
        if user_id.is_none() {
            let count = self.quota.track(&session_id).await?;
            if self.quota.exceeded(count) {
                log::info!(
                    "Demo limit reached for session {} ({} > {})",
                    session_id,
                    count,
                    self.quota.limit()
                );
                return Ok(ChatApiResponse::auth_required(
                    self.quota.quota(count),
                    DEMO_LIMIT_ADVISORY,
                ));
            }
            quota = Some(self.quota.quota(count));
        }

        let history = match user_id {
            Some(uid) => self.history.load_or_create(uid, &session_id).await?.messages,
            None => Vec::new(),
        };

        let reply = self.model.generate(&history, message).await.map_err(|e| {
            log::error!("Model {} failed for session {}: {}", self.model.model_name(), session_id, e);
            e
        })?;

        if let Some(uid) = user_id {
            let exchange = [
                StoredMessage::new(Role::User, message),
                StoredMessage::new(Role::Model, reply.as_str()),
            ];
            self.history
                .append(uid, &session_id, &exchange)
                .await
                .map_err(|e| {
                    log::error!("Persisting session {} to {} failed: {}", session_id, self.history.backend_name(), e);
                    e
                })?;
        }

        let response = ChatApiResponse::answer(session_id, reply);
        Ok(match quota {
            Some(quota) => response.with_quota(quota),
            None => response,
        })
    }

    async fn provision(&self, user_id: Option<&str>) -> Result<ChatApiResponse> {
        let session_id = server_session_id();
        log::debug!("Provisioned session {}", session_id);
        let response = ChatApiResponse::session_created(session_id.as_str());
        if user_id.is_some() {
            return Ok(response);
        }
        let count = self.quota.count(&session_id).await?;
        Ok(response.with_quota(self.quota.quota(count)))
    }
}
