//! Chat panel: the current conversation, notices above the input, and the
//! input row.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use chat_types::message::{ChatMessage, DeliveryStatus, Role};
use chat_types::session::ChatSession;

use crate::state::UiState;
use crate::theme::*;

pub const INPUT_HINT: &str = "اكتبلي، سولفلي، اسألني أي شئ";
pub const SIGN_IN_HINT: &str = "Please sign in to continue chatting";
pub const PAUSED_HINT: &str = "Service temporarily unavailable";
const EMPTY_GREETING: &str = "شلونك؟ شنو تحب نسولف اليوم؟";

/// Render the chat panel. Returns Some(message) when the user submits input.
///
/// While `paused` a submit opens the paused dialog instead of sending.
pub fn chat_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    session: Option<&ChatSession>,
    paused: bool,
) -> Option<String> {
    let mut submitted = None;
    let locked = session.is_some_and(|s| s.requires_auth || state.auth_required.contains(&s.id));

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    let title = session.map(ChatSession::title).unwrap_or_default();
                    ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let color = if state.is_busy() { WARNING } else { ACCENT };
                        ui.label(RichText::new(&state.status_text).color(color).small());
                    });
                });
                ui.separator();

                let reserved = 110.0;
                ScrollArea::vertical()
                    .max_height((ui.available_height() - reserved).max(80.0))
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| match session.filter(|s| !s.messages.is_empty()) {
                        Some(session) => {
                            for message in &session.messages {
                                render_message(ui, message);
                                ui.add_space(4.0);
                            }
                            if state.is_busy() {
                                ui.label(RichText::new("● ● ●").color(TEXT_MUTED));
                            }
                        }
                        None => {
                            ui.vertical_centered(|ui| {
                                ui.add_space(40.0);
                                ui.label(RichText::new(EMPTY_GREETING).color(TEXT_SECONDARY).size(20.0));
                            });
                        }
                    });

                render_notices(ui, state, locked);

                ui.horizontal(|ui| {
                    let hint = if paused {
                        PAUSED_HINT
                    } else if locked {
                        SIGN_IN_HINT
                    } else {
                        INPUT_HINT
                    };
                    let input = egui::TextEdit::singleline(&mut state.input_text)
                        .hint_text(hint)
                        .desired_width(ui.available_width() - 70.0)
                        .horizontal_align(Align::Max)
                        .font(egui::FontId::proportional(15.0));
                    let response = ui.add_enabled(!locked, input);

                    let send_enabled = !locked && !paused && !state.input_text.trim().is_empty();
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("إرسال").color(BG_PRIMARY))
                            .fill(if send_enabled { ACCENT } else { BG_INPUT })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if (enter || send_btn.clicked()) && !locked {
                        if paused {
                            state.show_paused_modal = true;
                        } else if let Some(text) = state.take_input() {
                            submitted = Some(text);
                            response.request_focus();
                        }
                    }
                });
            });
        });

    submitted
}

fn render_notices(ui: &mut egui::Ui, state: &mut UiState, locked: bool) {
    let mut dismiss = false;
    if let Some(error) = &state.error_banner {
        egui::Frame::default()
            .fill(ERROR_BG)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(6.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(error).color(ERROR));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        dismiss = ui.small_button("✕").clicked();
                    });
                });
            });
    }
    if dismiss {
        state.dismiss_error();
    }

    if locked {
        ui.label(
            RichText::new("لقد وصلت إلى الحد الأقصى للرسائل التجريبية. سجل دخولك للمتابعة.")
                .color(WARNING),
        );
    }

    if let Some(banner) = state.demo_banner() {
        ui.label(RichText::new(banner).color(TEXT_MUTED).small());
        if !locked {
            ui.label(
                RichText::new(
                    "Sign in to save your conversation history and continue chatting after the demo limit.",
                )
                .color(TEXT_MUTED)
                .small(),
            );
        }
    }
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage) {
    let (bg, layout) = match message.role {
        Role::User => (BG_USER_BUBBLE, Layout::right_to_left(Align::Min)),
        Role::Model => (BG_MODEL_BUBBLE, Layout::left_to_right(Align::Min)),
    };

    ui.with_layout(layout, |ui| {
        ui.set_max_width(ui.available_width() * 0.8);
        egui::Frame::default()
            .fill(bg)
            .corner_radius(BUBBLE_ROUNDING)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&message.content).color(TEXT_PRIMARY));
                match message.status {
                    DeliveryStatus::Pending => {
                        ui.label(RichText::new("…").color(TEXT_MUTED).small());
                    }
                    DeliveryStatus::Failed => {
                        ui.label(RichText::new("Not sent").color(ERROR).small());
                    }
                    DeliveryStatus::Confirmed => {}
                }
            });
    });
}
