use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::MetricKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Filtered rows, as they will be exported
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// Render the rows of the selected cities in source order.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let rows = &state.filtered.records;
    if rows.is_empty() {
        ui.label("No cities selected.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(100.0))
        .columns(Column::auto(), 3)
        .columns(Column::auto().at_least(70.0), MetricKind::ALL.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for title in ["City", "Lat", "Lon", "Month"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
            for kind in MetricKind::ALL {
                header.col(|ui| {
                    ui.strong(kind.label());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let rec = &rows[row.index()];
                row.col(|ui| {
                    ui.label(&rec.city);
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", rec.lat));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", rec.lon));
                });
                row.col(|ui| {
                    ui.label(&rec.month);
                });
                for kind in MetricKind::ALL {
                    row.col(|ui| {
                        ui.label(format!("{:.1}", kind.value(rec)));
                    });
                }
            });
        });
}
