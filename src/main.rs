mod app;
mod charts;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::HouseDashApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load().unwrap_or_else(|e| {
        log::error!("{e:#}; using default settings");
        DashboardConfig::default()
    });

    // A path on the command line wins over the configured one.
    let data_path: Option<PathBuf> = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.data_path.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let mut state = AppState::new(config);
    if let Some(path) = data_path {
        state.open(&path);
    }

    eframe::run_native(
        "Real Estate Interactive Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(HouseDashApp::new(state)))),
    )
}
