//! UI-level state that drives rendering.
//!
//! Conversation content lives in the session store; this only holds what
//! the client reports through the EventBus plus widget buffers.

use chat_types::api::DemoQuota;
use chat_types::event::ChatEvent;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_SENDING: &str = "Sending...";

/// State visible to UI panels
pub struct UiState {
    /// Input field content
    pub input_text: String,
    /// Status line text
    pub status_text: String,
    /// Last demo counters reported by the server
    pub demo: Option<DemoQuota>,
    /// Last error, shown as a dismissible banner
    pub error_banner: Option<String>,
    /// The "service temporarily unavailable" dialog
    pub show_paused_modal: bool,
    /// Session ids that hit the demo ceiling since startup
    pub auth_required: Vec<String>,
    /// Sidebar rename buffer: (session id, draft name)
    pub rename_draft: Option<(String, String)>,
    in_flight: u32,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            input_text: String::new(),
            status_text: STATUS_READY.to_string(),
            demo: None,
            error_banner: None,
            show_paused_modal: false,
            auth_required: Vec::new(),
            rename_draft: None,
            in_flight: 0,
        }
    }

    /// Fold drained client events into the view state
    pub fn process_events(&mut self, events: Vec<ChatEvent>) {
        for event in events {
            match event {
                ChatEvent::RequestStart { .. } => {
                    self.in_flight += 1;
                    self.error_banner = None;
                    self.status_text = STATUS_SENDING.to_string();
                }
                ChatEvent::SessionRotated { from, to } => {
                    log::debug!("Session {} is now {}", from, to);
                    if let Some((id, _)) = self.rename_draft.as_mut() {
                        if *id == from {
                            *id = to.clone();
                        }
                    }
                    for id in self.auth_required.iter_mut().filter(|id| **id == from) {
                        *id = to.clone();
                    }
                }
                ChatEvent::ReplyReceived { .. } => {}
                ChatEvent::QuotaUpdated { quota } => {
                    self.demo = Some(quota);
                }
                ChatEvent::AuthRequired { session_id } => {
                    if !self.auth_required.contains(&session_id) {
                        self.auth_required.push(session_id);
                    }
                }
                ChatEvent::Paused => {
                    self.show_paused_modal = true;
                }
                ChatEvent::RequestEnd { .. } => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if self.in_flight == 0 {
                        self.status_text = match &self.error_banner {
                            Some(message) => format!("Error: {}", message),
                            None => STATUS_READY.to_string(),
                        };
                    }
                }
                ChatEvent::Error { message } => {
                    self.status_text = format!("Error: {}", message);
                    self.error_banner = Some(message);
                }
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn dismiss_error(&mut self) {
        self.error_banner = None;
        if !self.is_busy() {
            self.status_text = STATUS_READY.to_string();
        }
    }

    /// "Demo mode: n/limit messages", while the server still counts us
    pub fn demo_banner(&self) -> Option<String> {
        let quota = self.demo.filter(|q| q.demo_mode)?;
        let mut text = format!(
            "Demo mode: {}/{} messages",
            quota.message_count, quota.message_limit
        );
        if quota.exhausted() {
            text.push_str(" - Sign in to continue chatting");
        }
        Some(text)
    }

    /// Take the input buffer for sending. Empty input stays put.
    pub fn take_input(&mut self) -> Option<String> {
        let text = self.input_text.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        self.input_text.clear();
        Some(text)
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
