//! Application state wiring the endpoint to its adapters.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::endpoint::ChatEndpoint;
use crate::history::{FirestoreHistoryStore, InMemoryHistoryStore};
use crate::identity::{AnonymousIdentity, RemoteSessionIdentity};
use crate::model::GeminiModel;
use crate::ports::{HistoryStore, IdentityPort, QuotaCounter};
use crate::quota::QuotaTracker;

/// Shared by every handler. Clone-cheap.
#[derive(Clone)]
pub struct AppState {
    pub endpoint: Arc<ChatEndpoint>,
    pub identity: Arc<dyn IdentityPort>,
    pub history: Arc<dyn HistoryStore>,
    pub protected_routes: Arc<[String]>,
}

impl AppState {
    pub fn new(
        endpoint: Arc<ChatEndpoint>,
        identity: Arc<dyn IdentityPort>,
        history: Arc<dyn HistoryStore>,
        protected_routes: Vec<String>,
    ) -> Self {
        Self {
            endpoint,
            identity,
            history,
            protected_routes: protected_routes.into(),
        }
    }

    /// Pick adapters from the config. `counter` is owned by the caller so it
    /// can run eviction on it.
    pub fn from_config(config: &ServerConfig, counter: Arc<dyn QuotaCounter>) -> Self {
        let history: Arc<dyn HistoryStore> = match &config.firestore {
            Some(firestore) => {
                log::info!("History store: Firestore project {}", firestore.project_id);
                Arc::new(FirestoreHistoryStore::new(firestore))
            }
            None => {
                log::info!("History store: in-memory");
                Arc::new(InMemoryHistoryStore::new())
            }
        };

        let identity: Arc<dyn IdentityPort> = match &config.auth_session_url {
            Some(url) => {
                log::info!("Identity: session endpoint {}", url);
                Arc::new(RemoteSessionIdentity::new(url.as_str()))
            }
            None => {
                log::warn!("AUTH_SESSION_URL not set, every caller is anonymous");
                Arc::new(AnonymousIdentity)
            }
        };

        if config.model.api_key.is_empty() {
            log::warn!("GEMINI_API_KEY not set, chat requests will fail");
        }

        let endpoint = ChatEndpoint::new(
            QuotaTracker::new(counter, config.demo_limit),
            Arc::new(GeminiModel::new(config.model.clone())),
            history.clone(),
        );

        Self::new(
            Arc::new(endpoint),
            identity,
            history,
            config.protected_routes.clone(),
        )
    }
}
