mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::ExplorerApp;
use clap::Parser;
use config::Config;
use data::cache::DatasetCache;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::parse();
    log::info!(
        "Starting with source {} (default range from {})",
        config.source.display(),
        config.start_year
    );

    let cache = DatasetCache::global();
    let state = AppState::initialize(cache, config.source, config.start_year);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CORD-19 Research Paper Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(ExplorerApp::new(state, cache)))),
    )
}
