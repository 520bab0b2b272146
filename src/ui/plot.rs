use eframe::egui::{self, RichText, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{normalize, scale_color};
use crate::data::filter::{entity_series, metric_range, month_frames, project_metric};
use crate::data::model::MetricKind;
use crate::state::AppState;

const MIN_RADIUS: f32 = 3.0;
const MAX_RADIUS: f32 = 16.0;

// ---------------------------------------------------------------------------
// Geographic view (one month frame at a time)
// ---------------------------------------------------------------------------

/// Bubble map of every city for the current month, coloured and sized by the
/// selected metric against the range of the whole table.
pub fn load_map(ui: &mut Ui, state: &mut AppState) {
    let projection = project_metric(&state.dataset, state.metric);
    let frames = month_frames(&projection, state.month_order);
    let Some((min, max)) = metric_range(&state.dataset, state.metric) else {
        ui.label("No rows loaded.");
        return;
    };
    state.frame = state.frame.min(frames.len().saturating_sub(1));

    // ---- Animation controls ----
    ui.horizontal(|ui: &mut Ui| {
        let play_label = if state.playing { "Pause" } else { "Play" };
        if ui.button(play_label).clicked() {
            state.playing = !state.playing;
            state.last_step = ui.input(|i| i.time);
        }
        let last = frames.len().saturating_sub(1);
        let month = frames[state.frame].month.clone();
        ui.add(
            egui::Slider::new(&mut state.frame, 0..=last)
                .show_value(false)
                .text(month),
        );
        ui.label(format!("{}: {min:.0} – {max:.0}", state.metric.label()));
    });

    let frame = &frames[state.frame];

    Plot::new("load_map")
        .height(460.0)
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-90.0)
        .include_y(90.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show_grid(true)
        .allow_scroll(false)
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.2}, {:.2}", value.y, value.x)
            } else {
                format!("{name}\n{:.2}, {:.2}", value.y, value.x)
            }
        })
        .show(ui, |plot_ui| {
            for row in &frame.rows {
                let t = normalize(row.value, min, max);
                let points = Points::new(PlotPoints::from(vec![[row.lon, row.lat]]))
                    .name(format!("{}: {:.1}", row.city, row.value))
                    .color(scale_color(t))
                    .radius(MIN_RADIUS + t * (MAX_RADIUS - MIN_RADIUS))
                    .filled(true);
                plot_ui.points(points);
            }
        });
}

// ---------------------------------------------------------------------------
// Per-metric time series for the selected cities
// ---------------------------------------------------------------------------

/// One line chart per metric, one line per selected city.
pub fn monthly_comparison(ui: &mut Ui, state: &AppState) {
    if state.filtered.is_empty() {
        ui.label("Select one or more cities to compare.");
        return;
    }

    let axis = state.month_order.sort(state.filtered.months());

    for kind in MetricKind::ALL {
        ui.label(RichText::new(kind.label()).strong());
        metric_chart(ui, state, kind, &axis);
        ui.add_space(8.0);
    }
}

fn metric_chart(ui: &mut Ui, state: &AppState, kind: MetricKind, axis: &[String]) {
    let series = entity_series(&state.filtered, kind, state.month_order);
    let labels = axis.to_vec();

    Plot::new(format!("series_{}", kind.key()))
        .height(220.0)
        .legend(Legend::default())
        .x_axis_label("Month")
        .y_axis_label("kWh")
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range| month_tick(&labels, mark.value))
        .show(ui, |plot_ui| {
            for s in &series {
                let color = state.color_map.color_for(&s.city);
                let coords: Vec<[f64; 2]> = s
                    .points
                    .iter()
                    .filter_map(|(month, value)| {
                        let x = axis.iter().position(|m| m == month)?;
                        Some([x as f64, *value])
                    })
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(coords.clone()))
                        .name(&s.city)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(&s.city)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

/// Month label for an integer grid mark, blank in between.
fn month_tick(labels: &[String], value: f64) -> String {
    if value.fract().abs() > 1e-6 || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}
