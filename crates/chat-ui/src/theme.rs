//! Colors and spacing for the chat UI

use egui::{Color32, CornerRadius, Stroke, Vec2};

pub const BG_PRIMARY: Color32 = Color32::from_rgb(27, 28, 29);
pub const BG_SIDEBAR: Color32 = Color32::from_rgb(32, 33, 35);
pub const BG_INPUT: Color32 = Color32::from_rgb(40, 42, 44);
pub const BG_MODAL: Color32 = Color32::from_rgb(26, 27, 35);
pub const BG_USER_BUBBLE: Color32 = Color32::from_rgb(6, 68, 197);
pub const BG_MODEL_BUBBLE: Color32 = Color32::from_rgb(42, 43, 50);
pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(226, 226, 226);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(111, 120, 138);
pub const ACCENT: Color32 = Color32::from_rgb(6, 223, 114);
pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);
pub const ERROR_BG: Color32 = Color32::from_rgb(60, 22, 22);
pub const WARNING: Color32 = Color32::from_rgb(251, 146, 60);

pub const PANEL_ROUNDING: CornerRadius = CornerRadius::same(6);
pub const BUBBLE_ROUNDING: CornerRadius = CornerRadius::same(14);
pub const PANEL_PADDING: Vec2 = Vec2::new(12.0, 8.0);

/// Apply the dark theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let visuals = &mut style.visuals;

    visuals.dark_mode = true;
    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_MODAL;
    visuals.extreme_bg_color = BG_INPUT;
    visuals.window_stroke = Stroke::new(1.0, TEXT_MUTED);

    visuals.widgets.inactive.bg_fill = BG_INPUT;
    visuals.widgets.inactive.weak_bg_fill = BG_INPUT;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.hovered.weak_bg_fill = BG_MODEL_BUBBLE;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, BG_PRIMARY);

    visuals.selection.bg_fill = ACCENT.linear_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    style.spacing.item_spacing = Vec2::new(8.0, 8.0);
    style.spacing.button_padding = Vec2::new(10.0, 6.0);

    ctx.set_style(style);
}
