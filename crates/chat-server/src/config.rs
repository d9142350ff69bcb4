//! Server configuration, read from the process environment.
//!
//! `from_env` loads a `.env` file first when one is present, so local
//! development works without exporting anything.

use std::time::Duration;

use chat_types::{
    ChatError, Result,
    config::{ModelConfig, DEMO_MESSAGE_LIMIT},
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_QUOTA_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_PROTECTED_ROUTES: [&str; 3] = ["/profile", "/settings", "/api/user"];

#[derive(Debug, Clone, PartialEq)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// OAuth2 bearer token; empty when running against the emulator
    pub access_token: String,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub model: ModelConfig,
    pub demo_limit: u32,
    /// `None` keeps chat history in process memory
    pub firestore: Option<FirestoreConfig>,
    /// External session endpoint; `None` treats every caller as anonymous
    pub auth_session_url: Option<String>,
    pub quota_idle_ttl: Duration,
    pub protected_routes: Vec<String>,
    /// Built browser client to serve for non-API paths
    pub web_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            model: ModelConfig::default(),
            demo_limit: DEMO_MESSAGE_LIMIT,
            firestore: None,
            auth_session_url: None,
            quota_idle_ttl: DEFAULT_QUOTA_IDLE_TTL,
            protected_routes: DEFAULT_PROTECTED_ROUTES.iter().map(|r| r.to_string()).collect(),
            web_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("CHAT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            config.model.api_key = key;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            config.model.model = model;
        }
        config.model.api_base = get("GEMINI_API_BASE");

        if let Some(limit) = get("DEMO_MESSAGE_LIMIT") {
            config.demo_limit = parse_number("DEMO_MESSAGE_LIMIT", &limit)?;
        }
        if let Some(ttl) = get("QUOTA_IDLE_TTL_SECS") {
            config.quota_idle_ttl = Duration::from_secs(parse_number("QUOTA_IDLE_TTL_SECS", &ttl)?);
        }

        config.firestore = get("FIRESTORE_PROJECT_ID").map(|project_id| FirestoreConfig {
            project_id,
            access_token: get("FIRESTORE_ACCESS_TOKEN").unwrap_or_default(),
            api_base: get("FIRESTORE_API_BASE"),
        });
        config.auth_session_url = get("AUTH_SESSION_URL");
        config.web_dir = get("CHAT_WEB_DIR");

        if let Some(routes) = get("PROTECTED_ROUTES") {
            config.protected_routes = routes
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ChatError::Config(format!("{} must be a non-negative integer, got {:?}", key, value)))
}
