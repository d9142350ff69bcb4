//! Firestore chat history over the REST API.
//!
//! Layout: `users/{uid}/chats/{sessionId}` documents holding
//! `{ createdAt, updatedAt, messages: [{ role, content, timestamp }] }`.
//! Appends use the `appendMissingElements` transform, so concurrent writers
//! union their messages instead of overwriting each other.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};

use chat_types::{
    ChatError, Result,
    ids::now_millis,
    message::{Role, StoredMessage},
    session::StoredChat,
};
use crate::config::FirestoreConfig;
use crate::ports::{HistoryStore, SchemaReport};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const CHECK_PAGE_SIZE: usize = 5;

pub struct FirestoreHistoryStore {
    client: Client,
    base_url: String,
    project_id: String,
    access_token: String,
}

impl FirestoreHistoryStore {
    pub fn new(config: &FirestoreConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            project_id: config.project_id.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn database(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    /// Document name used inside commit bodies.
    fn chat_name(&self, user_id: &str, session_id: &str) -> Result<String> {
        Ok(format!(
            "{}/users/{}/chats/{}",
            self.database(),
            document_id(user_id)?,
            document_id(session_id)?
        ))
    }

    /// REST url for `segments` under the database root. Each segment is
    /// pushed (and percent-encoded) on its own, never spliced into the path.
    pub(crate) fn document_url(&self, segments: &[&str]) -> Result<Url> {
        for segment in segments {
            document_id(segment)?;
        }
        let mut url = self.root_url("")?;
        url.path_segments_mut()
            .map_err(|_| ChatError::Config("Firestore base URL cannot hold a path".to_string()))?
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn chat_url(&self, user_id: &str, session_id: &str) -> Result<Url> {
        self.document_url(&["users", user_id, "chats", session_id])
    }

    fn root_url(&self, suffix: &str) -> Result<Url> {
        Url::parse(&format!("{}/v1/{}{}", self.base_url, self.database(), suffix))
            .map_err(|e| ChatError::Config(format!("Invalid Firestore URL: {}", e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        if self.access_token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.access_token)
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, Value)> {
        let response = builder
            .send()
            .await
            .map_err(|e| ChatError::Upstream(format!("Firestore request failed: {}", e)))?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    async fn fetch(&self, url: Url) -> Result<Option<StoredChat>> {
        let (status, body) = self.send(self.request(Method::GET, url)).await?;
        match status {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => decode_chat(&body).map(Some),
            s => Err(upstream_error("read", s, &body)),
        }
    }

    async fn list(&self, mut url: Url) -> Result<Vec<Value>> {
        url.query_pairs_mut()
            .append_pair("pageSize", &CHECK_PAGE_SIZE.to_string())
            .append_pair("showMissing", "true");
        let (status, body) = self.send(self.request(Method::GET, url)).await?;
        if !status.is_success() {
            return Err(upstream_error("list", status, &body));
        }
        Ok(body["documents"].as_array().cloned().unwrap_or_default())
    }
}

/// Firestore ids may not be empty, `.` or `..`, and may not contain `/`.
fn document_id(id: &str) -> Result<&str> {
    if id.is_empty() || id == "." || id == ".." || id.contains('/') {
        return Err(ChatError::Validation(format!("Invalid document id: {:?}", id)));
    }
    Ok(id)
}

#[async_trait]
impl HistoryStore for FirestoreHistoryStore {
    async fn load_or_create(&self, user_id: &str, session_id: &str) -> Result<StoredChat> {
        let url = self.chat_url(user_id, session_id)?;
        if let Some(chat) = self.fetch(url.clone()).await? {
            return Ok(chat);
        }

        let chat = StoredChat::empty();
        let mut create = url.clone();
        create.query_pairs_mut().append_pair("currentDocument.exists", "false");
        let (status, body) = self
            .send(self.request(Method::PATCH, create).json(&json!({ "fields": encode_chat(&chat) })))
            .await?;
        if status.is_success() {
            log::info!("Created chat document for user {}, session {}", user_id, session_id);
            return Ok(chat);
        }

        // Another request created it first.
        log::debug!("Chat document create raced ({}), re-reading", status);
        self.fetch(url)
            .await?
            .ok_or_else(|| upstream_error("create", status, &body))
    }

    async fn append(&self, user_id: &str, session_id: &str, messages: &[StoredMessage]) -> Result<()> {
        let name = self.chat_name(user_id, session_id)?;
        let body = append_commit(&name, messages, now_millis());
        let url = self.root_url(":commit")?;
        let (status, response) = self
            .send(self.request(Method::POST, url).json(&body))
            .await?;
        if !status.is_success() {
            return Err(upstream_error("append", status, &response));
        }
        log::info!("Saved {} message(s) for user {}, session {}", messages.len(), user_id, session_id);
        Ok(())
    }

    async fn check(&self) -> Result<SchemaReport> {
        let mut report = SchemaReport {
            backend: self.backend_name().to_string(),
            ..Default::default()
        };

        let users = self.list(self.document_url(&["users"])?).await?;
        report.users = users.len();
        report.sample_user = users
            .first()
            .and_then(|doc| doc["name"].as_str())
            .and_then(|name| name.rsplit('/').next())
            .map(str::to_string);

        if let Some(user) = report.sample_user.as_deref() {
            let chats = self.list(self.document_url(&["users", user, "chats"])?).await?;
            report.chats = chats.len();
            report.sample_chat_messages = chats
                .first()
                .and_then(|doc| decode_chat(doc).ok())
                .map(|chat| chat.messages.len());
        }

        log::info!(
            "Firestore schema check: {} user(s), {} chat(s) sampled",
            report.users,
            report.chats
        );
        Ok(report)
    }

    fn backend_name(&self) -> &str {
        "firestore"
    }
}

fn upstream_error(op: &str, status: StatusCode, body: &Value) -> ChatError {
    let detail = body["error"]["message"].as_str().unwrap_or("no details");
    ChatError::Upstream(format!("Firestore {} failed with HTTP {}: {}", op, status.as_u16(), detail))
}

// ─── Value encoding ──────────────────────────────────────────

fn timestamp_value(millis: i64) -> Value {
    let rfc3339 = DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    json!({ "timestampValue": rfc3339 })
}

pub(crate) fn encode_message(message: &StoredMessage) -> Value {
    json!({
        "mapValue": {
            "fields": {
                "role": { "stringValue": message.role.as_str() },
                "content": { "stringValue": message.content },
                "timestamp": { "integerValue": message.timestamp.to_string() },
            }
        }
    })
}

pub(crate) fn encode_chat(chat: &StoredChat) -> Value {
    let values: Vec<Value> = chat.messages.iter().map(encode_message).collect();
    json!({
        "createdAt": timestamp_value(chat.created_at),
        "updatedAt": timestamp_value(chat.updated_at),
        "messages": { "arrayValue": { "values": values } },
    })
}

/// Commit body: bump `updatedAt` and union `messages` into the document.
pub(crate) fn append_commit(name: &str, messages: &[StoredMessage], now: i64) -> Value {
    let values: Vec<Value> = messages.iter().map(encode_message).collect();
    json!({
        "writes": [{
            "update": {
                "name": name,
                "fields": { "updatedAt": timestamp_value(now) },
            },
            "updateMask": { "fieldPaths": ["updatedAt"] },
            "updateTransforms": [{
                "fieldPath": "messages",
                "appendMissingElements": { "values": values },
            }],
        }]
    })
}

// ─── Value decoding ──────────────────────────────────────────

fn decode_millis(value: &Value) -> i64 {
    if let Some(ts) = value["timestampValue"].as_str() {
        return DateTime::parse_from_rfc3339(ts)
            .map(|d| d.timestamp_millis())
            .unwrap_or(0);
    }
    if let Some(int) = value["integerValue"].as_str() {
        return int.parse().unwrap_or(0);
    }
    value["doubleValue"].as_f64().map(|f| f as i64).unwrap_or(0)
}

fn decode_message(value: &Value) -> Option<StoredMessage> {
    let fields = &value["mapValue"]["fields"];
    let content = fields["content"]["stringValue"].as_str()?;
    let role = match fields["role"]["stringValue"].as_str() {
        Some("user") => Role::User,
        _ => Role::Model,
    };
    Some(StoredMessage {
        role,
        content: content.to_string(),
        timestamp: decode_millis(&fields["timestamp"]),
    })
}

pub(crate) fn decode_chat(document: &Value) -> Result<StoredChat> {
    let fields = document
        .get("fields")
        .ok_or_else(|| ChatError::Upstream("Firestore document has no fields".to_string()))?;
    let messages = fields["messages"]["arrayValue"]["values"]
        .as_array()
        .map(|values| values.iter().filter_map(decode_message).collect())
        .unwrap_or_default();
    Ok(StoredChat {
        created_at: decode_millis(&fields["createdAt"]),
        updated_at: decode_millis(&fields["updatedAt"]),
        messages,
    })
}
