use std::path::PathBuf;

use gridstrument::{GridStrumentApp, PreferenceSet, spawn_engine};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_PREFS_FILE: &str = "gridstrument.ron";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let prefs_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFS_FILE));

    let prefs = match PreferenceSet::load_or_default(&prefs_path) {
        Ok(prefs) => prefs,
        Err(e) => {
            error!("Failed to load {}: {}", prefs_path.display(), e);
            PreferenceSet::default()
        }
    };

    let engine = spawn_engine(prefs.clone());
    let client = engine.client();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("GridStrument"),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "GridStrument",
        options,
        Box::new(|_cc| Ok(Box::new(GridStrumentApp::new(client, prefs, prefs_path)))),
    );

    // held notes must reach the synth before the process exits
    engine.shutdown();
}
