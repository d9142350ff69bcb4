use serde::{Deserialize, Serialize};

/// Anonymous visitors may send this many messages per session id.
pub const DEMO_MESSAGE_LIMIT: u32 = 3;

/// Browser-side configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin of the chat API; empty means same origin
    pub api_base: String,
    pub chat_path: String,
    /// Durable cache key for the serialized session list
    pub cache_key: String,
    /// Hard switch that rejects every send before any network call
    pub messaging_paused: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            chat_path: "/api/chat".to_string(),
            cache_key: "chatSessions".to_string(),
            messaging_paused: false,
        }
    }
}

impl ClientConfig {
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), self.chat_path)
    }
}

/// Generative model configuration. Sampling and safety are permanent
/// settings, never per-request options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub system_instruction: Option<String>,
    pub generation: GenerationConfig,
    pub safety: Vec<SafetySetting>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gemini-pro".to_string(),
            api_key: String::new(),
            api_base: None,
            system_instruction: Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            generation: GenerationConfig::default(),
            safety: SafetySetting::defaults(),
        }
    }
}

impl ModelConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    pub fn base_url(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(Self::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmBlockThreshold {
    #[serde(rename = "BLOCK_LOW_AND_ABOVE")]
    LowAndAbove,
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    MediumAndAbove,
    #[serde(rename = "BLOCK_ONLY_HIGH")]
    OnlyHigh,
    #[serde(rename = "BLOCK_NONE")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// Medium-and-above blocking on all four categories.
    pub fn defaults() -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: HarmBlockThreshold::MediumAndAbove,
        })
        .collect()
    }
}

const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an Iraqi AI assistant. \
Answer every question in the Iraqi Arabic dialect and never switch to another \
Arabic dialect or language. If the user writes in English, you may answer in \
English, but keep a friendly Iraqi tone.";
