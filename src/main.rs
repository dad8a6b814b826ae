mod app;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::TradeDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load().unwrap_or_else(|e| {
        log::error!("Ignoring configuration: {e:#}");
        DashboardConfig::default()
    });
    log::info!(
        "Starting with data file {} and {} preset",
        config.data_path.display(),
        config.preset.label()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Import Export Dashboard",
        options,
        Box::new(move |cc| {
            ui::apply_theme(&cc.egui_ctx);
            Ok(Box::new(TradeDashboardApp::new(&config)))
        }),
    )
}
