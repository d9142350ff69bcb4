//! Modal shown when sending is disabled service-wide.

use egui::{self, Align2, RichText};

use crate::state::UiState;
use crate::theme::*;

pub const PAUSED_TITLE: &str = "Service Temporarily Unavailable";
pub const CONTACT_EMAIL: &str = "hello@moonswhale.com";

pub fn paused_modal(ctx: &egui::Context, state: &mut UiState) {
    if !state.show_paused_modal {
        return;
    }

    let mut open = true;
    let mut understood = false;
    egui::Window::new(RichText::new(PAUSED_TITLE).color(WARNING).strong())
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.set_max_width(380.0);
            ui.label(
                RichText::new(
                    "We apologize, but our messaging service has reached capacity and is currently unavailable.",
                )
                .color(TEXT_SECONDARY),
            );
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Contact us at:").color(TEXT_MUTED));
                ui.hyperlink_to(
                    RichText::new(CONTACT_EMAIL).color(ACCENT),
                    format!("mailto:{}", CONTACT_EMAIL),
                );
            });
            ui.add_space(6.0);
            understood = ui.button("Understood").clicked();
        });

    if !open || understood {
        state.show_paused_modal = false;
    }
}
