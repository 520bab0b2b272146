use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::{save_csv, to_csv_bytes, DEFAULT_EXPORT_NAME};
use crate::data::loader::load_table;
use crate::data::model::{MetricKind, MonthOrder};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // ---- Load type selector ----
    ui.strong("Select Load Type");
    egui::ComboBox::from_id_salt("load_type")
        .width(ui.available_width())
        .selected_text(state.metric.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in MetricKind::ALL {
                ui.selectable_value(&mut state.metric, kind, kind.label());
            }
        });

    ui.add_space(4.0);
    ui.strong("Month order");
    egui::ComboBox::from_id_salt("month_order")
        .selected_text(state.month_order.label())
        .show_ui(ui, |ui: &mut Ui| {
            for order in MonthOrder::ALL {
                ui.selectable_value(&mut state.month_order, order, order.label());
            }
        });
    ui.separator();

    // ---- City multi-select ----
    let n_selected = state.selected.len();
    let n_total = state.dataset.entities.len();
    ui.strong(format!("Select Cities  ({n_selected}/{n_total})"));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    // Clone so we can mutate state inside the loop.
    let cities = state.dataset.entities.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for city in &cities {
                let mut checked = state.selected.contains(city);
                let text = RichText::new(city).color(state.color_map.color_for(city));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_city(city);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export filtered CSV…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Copy filtered CSV").clicked() {
                copy_filtered(ui, state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{}: {} rows, {} cities, {} shown",
            state
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            state.dataset.len(),
            state.dataset.entities.len(),
            state.filtered.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open city data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match load_table(&path, state.malformed_policy) {
            Ok(dataset) => {
                state.source = path;
                state.set_dataset(dataset);
            }
            Err(e) => {
                // The previous table stays on screen.
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data as CSV")
        .set_file_name(DEFAULT_EXPORT_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = save_csv(&state.filtered, &path) {
            log::error!("{e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

fn copy_filtered(ui: &Ui, state: &mut AppState) {
    match to_csv_bytes(&state.filtered) {
        Ok(bytes) => {
            ui.ctx().copy_text(String::from_utf8_lossy(&bytes).into_owned());
            log::info!("Copied {} rows to the clipboard", state.filtered.len());
        }
        Err(e) => {
            log::error!("{e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
