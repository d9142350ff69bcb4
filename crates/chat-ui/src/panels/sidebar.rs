//! Session list: new chat, switch, rename, delete.

use egui::{self, RichText, ScrollArea, Vec2};

use chat_types::session::SessionSummary;

use crate::state::UiState;
use crate::theme::*;

/// What the caller should do after rendering the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    None,
    NewChat,
    Select(String),
    Rename { id: String, name: String },
    Delete(String),
}

/// Most recently updated first
pub fn ordered(mut summaries: Vec<SessionSummary>) -> Vec<SessionSummary> {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    summaries
}

pub fn sidebar_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    summaries: Vec<SessionSummary>,
    current: Option<&str>,
) -> SidebarAction {
    let mut action = SidebarAction::None;

    egui::Frame::default()
        .fill(BG_SIDEBAR)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            let new_chat = egui::Button::new(RichText::new("+ محادثة جديدة").color(TEXT_PRIMARY))
                .fill(BG_INPUT)
                .corner_radius(PANEL_ROUNDING)
                .min_size(Vec2::new(ui.available_width(), 32.0));
            if ui.add(new_chat).clicked() {
                action = SidebarAction::NewChat;
            }
            ui.separator();

            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                for summary in ordered(summaries) {
                    let row = session_row(ui, state, &summary, current == Some(summary.id.as_str()));
                    if row != SidebarAction::None {
                        action = row;
                    }
                }
            });
        });

    action
}

fn session_row(
    ui: &mut egui::Ui,
    state: &mut UiState,
    summary: &SessionSummary,
    selected: bool,
) -> SidebarAction {
    let mut action = SidebarAction::None;

    if let Some((id, draft)) = state.rename_draft.as_mut().filter(|(id, _)| *id == summary.id) {
        let mut commit = None;
        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(draft);
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                commit = Some(true);
            }
            if ui.small_button("✓").clicked() {
                commit = Some(true);
            }
            if ui.small_button("✕").clicked() {
                commit = Some(false);
            }
        });
        match commit {
            Some(true) => {
                action = SidebarAction::Rename {
                    id: id.clone(),
                    name: draft.trim().to_string(),
                };
                state.rename_draft = None;
            }
            Some(false) => state.rename_draft = None,
            None => {}
        }
        return action;
    }

    ui.horizontal(|ui| {
        let color = if selected { ACCENT } else { TEXT_SECONDARY };
        let label = ui.selectable_label(selected, RichText::new(&summary.title).color(color));
        if label.clicked() && !selected {
            action = SidebarAction::Select(summary.id.clone());
        }
        label.context_menu(|ui| {
            if ui.button("Rename").clicked() {
                state.rename_draft = Some((summary.id.clone(), summary.title.clone()));
                ui.close();
            }
            if ui.button(RichText::new("Delete").color(ERROR)).clicked() {
                action = SidebarAction::Delete(summary.id.clone());
                ui.close();
            }
        });
    });

    action
}
