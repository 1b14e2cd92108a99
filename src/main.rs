#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe_sketch::{EditorConfig, SketchApp};

/// Reads an optional JSON config passed as the first argument.
fn config_from_args() -> Option<EditorConfig> {
    let path = std::env::args().nth(1)?;
    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(err) => {
            log::error!("Cannot read config {path}: {err}");
            return None;
        }
    };
    match EditorConfig::from_json(&json) {
        Ok(config) => Some(config),
        Err(err) => {
            log::error!("Invalid config {path}: {err}");
            None
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = config_from_args();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "eframe sketch",
        native_options,
        Box::new(|cc| Ok(Box::new(SketchApp::new(cc, config)))),
    )
}
