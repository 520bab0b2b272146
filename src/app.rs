use std::time::Duration;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Map animation ----
        let n_frames = self.state.dataset.months().len();
        let now = ctx.input(|i| i.time);
        self.state.tick(now, n_frames);
        if self.state.playing {
            ctx.request_repaint_after(Duration::from_secs_f64(self.state.frame_interval));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map, series, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Global Energy Load Explorer");
                    ui.label(
                        egui::RichText::new(
                            "Note: Simulations are based on a 100 m² home with a 50 m² rooftop solar.",
                        )
                        .italics(),
                    );
                    ui.separator();

                    ui.heading("Global Load Heatmap");
                    plot::load_map(ui, &mut self.state);
                    ui.separator();

                    ui.heading("Monthly Load Comparison");
                    plot::monthly_comparison(ui, &self.state);
                    ui.separator();

                    egui::CollapsingHeader::new("Filtered data")
                        .default_open(false)
                        .show(ui, |ui| {
                            table::data_table(ui, &self.state);
                        });
                });
        });
    }
}
