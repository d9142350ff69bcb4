//! Process-local chat history. Lost on restart.

use async_trait::async_trait;
use dashmap::DashMap;

use chat_types::{Result, ids::now_millis, message::StoredMessage, session::StoredChat};
use crate::ports::{HistoryStore, SchemaReport};

/// Documents keyed by `(user_id, session_id)`.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    chats: DashMap<(String, String), StoredChat>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str, session_id: &str) -> Option<StoredChat> {
        self.chats
            .get(&(user_id.to_string(), session_id.to_string()))
            .map(|c| c.clone())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load_or_create(&self, user_id: &str, session_id: &str) -> Result<StoredChat> {
        let chat = self
            .chats
            .entry((user_id.to_string(), session_id.to_string()))
            .or_insert_with(|| {
                log::info!("Created chat document for user {}, session {}", user_id, session_id);
                StoredChat::empty()
            });
        Ok(chat.clone())
    }

    async fn append(&self, user_id: &str, session_id: &str, messages: &[StoredMessage]) -> Result<()> {
        let mut chat = self
            .chats
            .entry((user_id.to_string(), session_id.to_string()))
            .or_insert_with(StoredChat::empty);
        for message in messages {
            if !chat.messages.contains(message) {
                chat.messages.push(message.clone());
            }
        }
        chat.updated_at = now_millis().max(chat.updated_at);
        Ok(())
    }

    async fn check(&self) -> Result<SchemaReport> {
        let mut users: Vec<&str> = Vec::new();
        let mut report = SchemaReport {
            backend: self.backend_name().to_string(),
            ..Default::default()
        };
        let entries: Vec<((String, String), usize)> = self
            .chats
            .iter()
            .map(|e| (e.key().clone(), e.value().messages.len()))
            .collect();
        for ((user, _), count) in &entries {
            if !users.contains(&user.as_str()) {
                users.push(user);
            }
            if report.sample_chat_messages.is_none() {
                report.sample_chat_messages = Some(*count);
            }
        }
        report.users = users.len();
        report.sample_user = users.first().map(|u| u.to_string());
        report.chats = entries.len();
        Ok(report)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
