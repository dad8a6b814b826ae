use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TradeDashboardApp {
    pub state: AppState,
}

impl TradeDashboardApp {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            state: AppState::from_config(config),
        }
    }
}

impl eframe::App for TradeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart type and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_panel(ui, &self.state);
        });
    }
}
