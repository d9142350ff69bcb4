//! The browser chat client driven against the real endpoint, in process.
//!
//! The transport calls `ChatEndpoint::handle` directly, so both halves of
//! the protocol run unmodified with only the HTTP hop removed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use chat_core::client::{ChatClient, SendOutcome};
use chat_core::event_bus::EventBus;
use chat_core::ports::{CachePort, ChatApiPort};
use chat_core::session_store::SessionStore;
use chat_server::history::InMemoryHistoryStore;
use chat_server::ports::ModelPort;
use chat_server::{ChatEndpoint, InMemoryQuotaCounter, QuotaTracker};
use chat_types::api::{ChatApiRequest, ChatApiResponse, DemoQuota};
use chat_types::config::ClientConfig;
use chat_types::message::{DeliveryStatus, Role, StoredMessage};
use chat_types::session::SessionPhase;
use chat_types::{ChatError, Result};

struct EchoModel {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelPort for EchoModel {
    async fn generate(&self, _history: &[StoredMessage], message: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("echo: {}", message))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

#[derive(Default)]
struct MapCache {
    entries: RefCell<HashMap<String, String>>,
}

impl CachePort for MapCache {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "map"
    }
}

/// Transport that hands the request straight to the endpoint
struct InProcessApi {
    endpoint: Arc<ChatEndpoint>,
    user: Option<String>,
    calls: AtomicUsize,
}

#[async_trait(?Send)]
impl ChatApiPort for InProcessApi {
    async fn send(&self, req: &ChatApiRequest) -> Result<ChatApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.endpoint
            .handle(self.user.as_deref(), req.clone())
            .await
            .map_err(|e| ChatError::Api { status: e.status_code(), message: e.to_string() })
    }

    fn endpoint(&self) -> &str {
        "in-process"
    }
}

struct Harness {
    client: ChatClient,
    api: Rc<InProcessApi>,
    store: Rc<RefCell<SessionStore>>,
    model: Arc<EchoModel>,
    history: Arc<InMemoryHistoryStore>,
}

fn harness(user: Option<&str>, config: ClientConfig) -> Harness {
    let model = Arc::new(EchoModel { calls: AtomicUsize::new(0) });
    let history = Arc::new(InMemoryHistoryStore::new());
    let quota = QuotaTracker::new(Arc::new(InMemoryQuotaCounter::new()), 3);
    let endpoint = Arc::new(ChatEndpoint::new(quota, model.clone(), history.clone()));

    let api = Rc::new(InProcessApi {
        endpoint,
        user: user.map(str::to_string),
        calls: AtomicUsize::new(0),
    });
    let store = Rc::new(RefCell::new(SessionStore::open(Rc::new(MapCache::default()), "chatSessions")));
    let client = ChatClient::new(api.clone(), store.clone(), EventBus::new(), &config);
    Harness { client, api, store, model, history }
}

#[tokio::test]
async fn first_message_provisions_and_is_answered_once() {
    let h = harness(None, ClientConfig::default());

    let outcome = h.client.send_message(None, "hello").await.unwrap();

    let SendOutcome::Answered { session_id, reply } = outcome else {
        panic!("expected an answer");
    };
    assert!(session_id.starts_with("chat_"));
    assert_eq!(reply.content, "echo: hello");
    assert_eq!(h.api.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 1);

    let store = h.store.borrow();
    assert_eq!(store.sessions().len(), 1);
    assert_eq!(store.current_session_id(), Some(session_id.as_str()));
    let session = store.session(&session_id).unwrap();
    assert_eq!(session.phase, SessionPhase::Committed);
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].status, DeliveryStatus::Confirmed);
    assert_eq!(
        h.client.demo_status(),
        Some(DemoQuota { demo_mode: true, message_count: 1, message_limit: 3 })
    );
}

#[tokio::test]
async fn demo_limit_reached_on_fourth_message() {
    let h = harness(None, ClientConfig::default());

    for _ in 0..3 {
        let outcome = h.client.send_message(None, "hi").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Answered { .. }));
    }
    let outcome = h.client.send_message(None, "hi").await.unwrap();
    assert!(matches!(outcome, SendOutcome::AuthRequired { .. }));
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 3);
    assert!(h.client.demo_status().unwrap().exhausted());

    let store = h.store.borrow();
    let session = store.current_session().unwrap();
    assert!(session.requires_auth);
    assert_eq!(session.messages.len(), 8);
    assert_eq!(session.messages[7].role, Role::Model);
}

#[tokio::test]
async fn signed_in_exchange_is_persisted() {
    let h = harness(Some("user-1"), ClientConfig::default());

    let SendOutcome::Answered { session_id, .. } = h.client.send_message(None, "hello").await.unwrap() else {
        panic!("expected an answer");
    };

    let chat = h.history.get("user-1", &session_id).unwrap();
    let pairs: Vec<(Role, &str)> = chat.messages.iter().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(pairs, vec![(Role::User, "hello"), (Role::Model, "echo: hello")]);
    assert!(h.client.demo_status().is_none());
}

#[tokio::test]
async fn paused_client_never_reaches_the_endpoint() {
    let config = ClientConfig { messaging_paused: true, ..Default::default() };
    let h = harness(None, config);

    assert_eq!(h.client.send_message(None, "hi").await.unwrap(), SendOutcome::Paused);
    assert_eq!(h.api.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn second_session_gets_its_own_quota() {
    let h = harness(None, ClientConfig::default());
    for _ in 0..4 {
        h.client.send_message(None, "hi").await.unwrap();
    }

    h.store.borrow_mut().create_session();
    let outcome = h.client.send_message(None, "fresh start").await.unwrap();
    assert!(matches!(outcome, SendOutcome::Answered { .. }));
    assert_eq!(h.store.borrow().sessions().len(), 2);
}
