//! WASM-target tests for chat-platform (Node.js runtime).
//!
//! Covers MemoryCache and the fetch error mapping under
//! wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! localStorage needs a browser window and is not exercised here.

use wasm_bindgen_test::*;

use chat_core::ports::CachePort;
use chat_core::session_store::SessionStore;
use chat_platform::api::fetch::error_from_body;
use chat_platform::cache::MemoryCache;
use chat_types::ChatError;
use chat_types::message::ChatMessage;
use std::rc::Rc;

// ─── MemoryCache Tests ───────────────────────────────────

#[wasm_bindgen_test]
fn memory_cache_backend_name() {
    assert_eq!(MemoryCache::new().backend_name(), "memory");
}

#[wasm_bindgen_test]
fn memory_cache_read_missing() {
    let cache = MemoryCache::new();
    assert!(cache.read("nonexistent").unwrap().is_none());
}

#[wasm_bindgen_test]
fn memory_cache_write_and_read() {
    let cache = MemoryCache::new();
    cache.write("chatSessions", "[]").unwrap();
    assert_eq!(cache.read("chatSessions").unwrap().as_deref(), Some("[]"));
    assert_eq!(cache.len(), 1);
}

#[wasm_bindgen_test]
fn memory_cache_overwrite() {
    let cache = MemoryCache::new();
    cache.write("key", "v1").unwrap();
    cache.write("key", "v2").unwrap();
    assert_eq!(cache.read("key").unwrap().as_deref(), Some("v2"));
}

#[wasm_bindgen_test]
fn memory_cache_remove() {
    let cache = MemoryCache::new();
    cache.write("key", "val").unwrap();
    cache.remove("key").unwrap();
    assert!(cache.read("key").unwrap().is_none());
    cache.remove("key").unwrap();
    assert!(cache.is_empty());
}

#[wasm_bindgen_test]
fn memory_cache_unicode_value() {
    let cache = MemoryCache::new();
    let text = "شلونك؟ هلا بيك 🌴";
    cache.write("greeting", text).unwrap();
    assert_eq!(cache.read("greeting").unwrap().as_deref(), Some(text));
}

#[wasm_bindgen_test]
fn session_store_survives_reopen_on_memory_cache() {
    let cache = Rc::new(MemoryCache::new());
    let id = {
        let mut store = SessionStore::open(cache.clone(), "chatSessions");
        let id = store.create_session().id;
        store.append_message(&id, ChatMessage::user("hello"));
        id
    };
    let store = SessionStore::open(cache, "chatSessions");
    assert_eq!(store.current_session_id(), Some(id.as_str()));
    assert_eq!(store.session(&id).unwrap().messages.len(), 1);
}

// ─── Error Mapping Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn error_body_message_is_used() {
    let err = error_from_body(400, r#"{"error":"Message is required"}"#);
    assert_eq!(err, ChatError::Api { status: 400, message: "Message is required".to_string() });
}

#[wasm_bindgen_test]
fn error_body_with_details() {
    let err = error_from_body(500, r#"{"error":"Internal server error","details":"boom"}"#);
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("Internal server error"));
}

#[wasm_bindgen_test]
fn unparseable_error_body_falls_back() {
    let err = error_from_body(502, "<html>Bad Gateway</html>");
    assert_eq!(err, ChatError::Api { status: 502, message: "Failed to send message".to_string() });
}
