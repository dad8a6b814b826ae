pub mod panels;
pub mod plot;

use eframe::egui::{self, Color32};

/// Black panels with white text, applied once at startup.
pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = Color32::BLACK;
    visuals.window_fill = Color32::BLACK;
    visuals.extreme_bg_color = Color32::BLACK;
    visuals.override_text_color = Some(Color32::WHITE);
    ctx.set_visuals(visuals);
}
