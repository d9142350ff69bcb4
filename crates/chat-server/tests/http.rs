//! The full router served on a loopback port and exercised with reqwest.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use chat_server::history::InMemoryHistoryStore;
use chat_server::http::router::build_router;
use chat_server::ports::{IdentityPort, ModelPort};
use chat_server::{AppState, ChatEndpoint, InMemoryQuotaCounter, QuotaTracker};
use chat_types::message::StoredMessage;
use chat_types::Result;

struct FixedModel;

#[async_trait]
impl ModelPort for FixedModel {
    async fn generate(&self, _history: &[StoredMessage], _message: &str) -> Result<String> {
        Ok("أهلاً".to_string())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Signed in when the request carries `x-test-user`
struct HeaderIdentity;

#[async_trait]
impl IdentityPort for HeaderIdentity {
    async fn identify(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get("x-test-user")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

async fn serve() -> String {
    let history = Arc::new(InMemoryHistoryStore::new());
    let quota = QuotaTracker::new(Arc::new(InMemoryQuotaCounter::new()), 3);
    let endpoint = ChatEndpoint::new(quota, Arc::new(FixedModel), history.clone());
    let state = AppState::new(
        Arc::new(endpoint),
        Arc::new(HeaderIdentity),
        history,
        vec!["/profile".to_string(), "/settings".to_string()],
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state, None)).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let base = serve().await;
    let response = client().get(format!("{}/api/health", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn chat_provisions_then_answers() {
    let base = serve().await;
    let http = client();

    let created: Value = http
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": "hi" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["message"], "Session created");
    let session_id = created["sessionId"].as_str().unwrap().to_string();

    let answered: Value = http
        .post(format!("{}/api/chat", base))
        .json(&json!({ "sessionId": session_id, "message": "hi" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(answered["response"], "أهلاً");
    assert_eq!(answered["sessionId"], session_id.as_str());
    assert_eq!(answered["demoMode"], true);
    assert_eq!(answered["messageCount"], 1);
    assert_eq!(answered["messageLimit"], 3);
}

#[tokio::test]
async fn chat_without_message_is_bad_request() {
    let base = serve().await;
    let response = client()
        .post(format!("{}/api/chat", base))
        .json(&json!({ "sessionId": "s" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "error": "Message is required" }));
}

#[tokio::test]
async fn chat_with_path_like_session_id_is_bad_request() {
    let base = serve().await;
    let response = client()
        .post(format!("{}/api/chat", base))
        .header("x-test-user", "alice")
        .json(&json!({ "sessionId": "../../bob/chats/secret", "message": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "error": "Invalid session id" }));
}

#[tokio::test]
async fn chat_with_malformed_body_is_bad_request() {
    let base = serve().await;
    let response = client()
        .post(format!("{}/api/chat", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>().await.unwrap()["error"].is_string());
}

#[tokio::test]
async fn anonymous_protected_route_redirects_to_sign_in() {
    let base = serve().await;
    let response = client().get(format!("{}/profile", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        "/auth/signin?callbackUrl=%2Fprofile"
    );
}

#[tokio::test]
async fn signed_in_protected_route_passes_the_gate() {
    let base = serve().await;
    let response = client()
        .get(format!("{}/settings", base))
        .header("x-test-user", "u1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn db_check_reports_the_backend() {
    let base = serve().await;
    let body: Value = client()
        .get(format!("{}/api/debug/db-check", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "Database schema check completed");
    assert_eq!(body["result"]["backend"], "memory");
}
