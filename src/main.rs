#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod editor;
mod io;
mod model;
mod settings;
mod ui;

use log::info;

fn main() -> eframe::Result<()> {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("egui", log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .format_timestamp_millis()
        .init();

    let paths = settings::AppPaths::discover();
    info!("Rust Timetrack starting, settings at {}", paths.settings_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 640.0])
            .with_min_inner_size([800.0, 360.0])
            .with_title("Rust Timetrack"),
        ..Default::default()
    };

    eframe::run_native(
        "Rust Timetrack",
        options,
        Box::new(move |cc| Ok(Box::new(app::TrackerApp::new(cc, paths)))),
    )
}
