//! Gemini `generateContent` adapter over reqwest.
//!
//! History goes out as `user`/`model` turns, followed by the new user turn.
//! Sampling and safety settings come from [`ModelConfig`] and never vary per
//! request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use chat_types::{
    ChatError, Result,
    config::{GenerationConfig, ModelConfig, SafetySetting},
    message::{Role, StoredMessage},
};
use crate::ports::ModelPort;

pub struct GeminiModel {
    client: Client,
    config: ModelConfig,
}

impl GeminiModel {
    pub fn new(config: ModelConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: ModelConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model
        )
    }
}

#[async_trait]
impl ModelPort for GeminiModel {
    async fn generate(&self, history: &[StoredMessage], message: &str) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(ChatError::Config("Gemini API key not configured".to_string()));
        }

        log::debug!("Using Gemini model: {}", self.config.model);
        let body = build_request(&self.config, history, message);
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Upstream(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(http_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Upstream(format!("Failed to parse Gemini response: {}", e)))?;
        extract_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: &'a GenerationConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text.to_string()) }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

// ─── Mapping ─────────────────────────────────────────────────

pub(crate) fn build_request<'a>(
    config: &'a ModelConfig,
    history: &[StoredMessage],
    message: &str,
) -> GenerateContentRequest<'a> {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|m| Content::text(Some(m.role.as_str()), &m.content))
        .collect();
    contents.push(Content::text(Some(Role::User.as_str()), message));

    GenerateContentRequest {
        contents,
        system_instruction: config
            .system_instruction
            .as_deref()
            .map(|text| Content::text(None, text)),
        generation_config: &config.generation,
        safety_settings: &config.safety,
    }
}

pub(crate) fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ChatError::Upstream(format!("Prompt blocked by Gemini: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Upstream("Gemini returned no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(ChatError::Upstream(format!(
            "Gemini returned an empty reply (finish reason {})",
            reason
        )));
    }
    Ok(text)
}

fn http_error(status: u16, body: &str) -> ChatError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|w| match (w.error.status, w.error.message) {
            (Some(s), Some(m)) => Some(format!("{}: {}", s, m)),
            (None, Some(m)) => Some(m),
            (Some(s), None) => Some(s),
            (None, None) => None,
        })
        .unwrap_or_else(|| body.to_string());
    ChatError::Upstream(format!("Gemini API returned HTTP {}: {}", status, message))
}
