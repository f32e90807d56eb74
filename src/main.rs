mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod transform;
mod ui;

use std::path::PathBuf;

use app::WranglerApp;
use config::AppConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let mut state = AppState::new(config);
    // Optional file to open on start-up.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.load_path(&path);
    }

    eframe::run_native(
        "Rusty Wrangler",
        options,
        Box::new(move |_cc| Ok(Box::new(WranglerApp::new(state)))),
    )
}
