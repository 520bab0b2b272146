use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use energy_load_explorer::app::ExplorerApp;
use energy_load_explorer::cli::Cli;
use energy_load_explorer::data::loader;
use energy_load_explorer::state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // The table is built once here; the viewer only filters it.
    let dataset = loader::load_table(&cli.data, cli.on_malformed).inspect_err(|e| {
        log::error!("Failed to load city data: {e}");
    })?;

    let mut state = AppState::new(dataset, cli.data.clone(), &cli.default_city);
    state.metric = cli.metric;
    state.month_order = cli.month_order;
    state.malformed_policy = cli.on_malformed;
    state.frame_interval = cli.frame_interval_ms.max(50) as f64 / 1000.0;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Global Energy Load Explorer",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ExplorerApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running viewer")
}
