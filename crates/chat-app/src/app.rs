//! Main egui application: sidebar, conversation, and the paused dialog.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};

use chat_core::client::{ChatClient, SendOutcome};
use chat_core::event_bus::EventBus;
use chat_core::session_store::SessionStore;
use chat_platform::api::FetchChatApi;
use chat_platform::cache::auto_detect_cache;
use chat_types::config::ClientConfig;
use chat_ui::panels::sidebar::SidebarAction;
use chat_ui::panels::{chat, notices, sidebar};
use chat_ui::state::UiState;
use chat_ui::theme;

const ARABIC_FONT_URL: &str = "NotoSansArabic-Regular.ttf";
const SIGN_IN_URL: &str = "/auth/signin";

/// Build-time switches, so a deploy can pause messaging without code changes
fn client_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(base) = option_env!("CHAT_API_BASE") {
        config.api_base = base.to_string();
    }
    config.messaging_paused = matches!(option_env!("CHAT_MESSAGING_PAUSED"), Some("1" | "true"));
    config
}

pub struct ChatApp {
    ui_state: UiState,
    event_bus: EventBus,
    store: Rc<RefCell<SessionStore>>,
    client: Rc<ChatClient>,
    first_frame: bool,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = client_config();
        let event_bus = EventBus::new();

        let store = Rc::new(RefCell::new(SessionStore::open(
            auto_detect_cache(),
            config.cache_key.clone(),
        )));
        let api = Rc::new(FetchChatApi::new(&config));
        let client = Rc::new(ChatClient::new(api, store.clone(), event_bus.clone(), &config));

        log::info!(
            "Restored {} session(s), messaging {}",
            store.borrow().sessions().len(),
            if config.messaging_paused { "paused" } else { "enabled" }
        );

        Self {
            ui_state: UiState::new(),
            event_bus,
            store,
            client,
            first_frame: true,
        }
    }

    /// Fetch the Arabic font from the server and install it into egui
    fn load_arabic_font(ctx: egui::Context) {
        wasm_bindgen_futures::spawn_local(async move {
            let Some(window) = web_sys::window() else {
                return;
            };
            let resp = match wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(ARABIC_FONT_URL)).await {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Failed to fetch Arabic font: {:?}", e);
                    return;
                }
            };
            let resp: web_sys::Response = resp.into();
            if !resp.ok() {
                log::warn!("Arabic font request returned {}", resp.status());
                return;
            }
            let buf = match resp.array_buffer() {
                Ok(p) => match wasm_bindgen_futures::JsFuture::from(p).await {
                    Ok(b) => b,
                    Err(_) => return,
                },
                Err(_) => return,
            };
            let bytes = js_sys::Uint8Array::new(&buf).to_vec();

            let mut fonts = egui::FontDefinitions::default();
            fonts.font_data.insert(
                "noto_sans_arabic".to_owned(),
                egui::FontData::from_owned(bytes).into(),
            );
            fonts
                .families
                .entry(egui::FontFamily::Proportional)
                .or_default()
                .push("noto_sans_arabic".to_owned());

            ctx.set_fonts(fonts);
            ctx.request_repaint();
            log::info!("Arabic font loaded");
        });
    }

    fn apply_sidebar_action(&mut self, action: SidebarAction) {
        let mut store = self.store.borrow_mut();
        match action {
            SidebarAction::None => {}
            SidebarAction::NewChat => {
                let session = store.create_session();
                log::info!("New chat {}", session.id);
            }
            SidebarAction::Select(id) => {
                store.set_current_session_id(&id);
            }
            SidebarAction::Rename { id, name } => {
                store.rename_session(&id, &name);
            }
            SidebarAction::Delete(id) => {
                store.delete_session(&id);
            }
        }
    }

    /// Send to the current session (async)
    fn dispatch_message(&self, text: String, ctx: &egui::Context) {
        let client = self.client.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            match client.send_message(None, &text).await {
                Ok(SendOutcome::Answered { session_id, .. }) => {
                    log::debug!("Reply received for {}", session_id);
                }
                Ok(SendOutcome::AuthRequired { session_id, .. }) => {
                    log::info!("Demo limit reached for {}", session_id);
                }
                Ok(SendOutcome::Paused) => {}
                Err(e) => log::error!("Send failed: {}", e),
            }
            ctx.request_repaint();
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            Self::load_arabic_font(ctx.clone());
            self.first_frame = false;
        }

        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }
        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("سولف").strong().color(theme::ACCENT).size(18.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.ui_state.demo.is_some_and(|q| q.demo_mode) {
                        ui.hyperlink_to(RichText::new("Sign in").color(theme::ACCENT), SIGN_IN_URL);
                    }
                });
            });
        });

        // ── Sessions ─────────────────────────────────────────
        let (summaries, current) = {
            let store = self.store.borrow();
            (store.summaries(), store.current_session_id().map(str::to_string))
        };
        let action = SidePanel::left("sessions")
            .min_width(200.0)
            .max_width(280.0)
            .show(ctx, |ui| sidebar::sidebar_panel(ui, &mut self.ui_state, summaries, current.as_deref()))
            .inner;
        self.apply_sidebar_action(action);

        // ── Conversation ─────────────────────────────────────
        let session = self.store.borrow().current_session().cloned();
        let paused = self.client.is_paused();
        let submitted = CentralPanel::default()
            .show(ctx, |ui| chat::chat_panel(ui, &mut self.ui_state, session.as_ref(), paused))
            .inner;
        if let Some(text) = submitted {
            self.dispatch_message(text, ctx);
        }

        notices::paused_modal(ctx, &mut self.ui_state);
    }
}
