//! WASM-target tests for chat-ui.
//!
//! Runs the UiState event projection and sidebar ordering under
//! wasm32-unknown-unknown via `wasm-pack test --node`. Rendering needs a
//! canvas and is not exercised here.

use wasm_bindgen_test::*;

use chat_types::api::DemoQuota;
use chat_types::event::ChatEvent;
use chat_types::session::SessionSummary;
use chat_ui::panels::sidebar::ordered;
use chat_ui::state::{UiState, STATUS_READY};

#[wasm_bindgen_test]
fn send_cycle_returns_to_ready() {
    let mut state = UiState::new();
    state.process_events(vec![
        ChatEvent::RequestStart { session_id: "s".to_string() },
        ChatEvent::QuotaUpdated {
            quota: DemoQuota { demo_mode: true, message_count: 1, message_limit: 3 },
        },
        ChatEvent::RequestEnd { session_id: "s".to_string() },
    ]);
    assert!(!state.is_busy());
    assert_eq!(state.status_text, STATUS_READY);
    assert_eq!(state.demo_banner().as_deref(), Some("Demo mode: 1/3 messages"));
}

#[wasm_bindgen_test]
fn paused_event_opens_modal() {
    let mut state = UiState::new();
    state.process_events(vec![ChatEvent::Paused]);
    assert!(state.show_paused_modal);
}

#[wasm_bindgen_test]
fn sidebar_newest_first() {
    let summary = |id: &str, updated_at: i64| SessionSummary {
        id: id.to_string(),
        title: id.to_string(),
        updated_at,
        message_count: 1,
    };
    let ordered = ordered(vec![summary("old", 1), summary("new", 2)]);
    assert_eq!(ordered[0].id, "new");
}
