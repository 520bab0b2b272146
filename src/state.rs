use std::path::PathBuf;

use crate::color::ColorMap;
use crate::data::builder::MalformedPolicy;
use crate::data::filter::{filter_by_entities, Selection};
use crate::data::model::{EnrichedTable, MetricKind, MonthOrder};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// `dataset` is replaced wholesale when another file is opened and never
/// edited in place; `filtered` is rebuilt from it after every selection change.
pub struct AppState {
    /// The enriched table everything is derived from.
    pub dataset: EnrichedTable,

    /// Where `dataset` came from.
    pub source: PathBuf,

    /// City preselected whenever a dataset is loaded.
    pub default_city: String,

    /// Cities chosen in the side panel.
    pub selected: Selection,

    /// Rows of the selected cities (cached).
    pub filtered: EnrichedTable,

    /// Metric driving the map.
    pub metric: MetricKind,

    /// Month ordering for frames and chart axes.
    pub month_order: MonthOrder,

    /// Policy used when (re)loading files.
    pub malformed_policy: MalformedPolicy,

    /// One colour per city.
    pub color_map: ColorMap,

    /// Index of the month frame shown on the map.
    pub frame: usize,

    /// Whether the map animation is running.
    pub playing: bool,

    /// Seconds between animation steps.
    pub frame_interval: f64,

    /// egui time of the last animation step.
    pub last_step: f64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: EnrichedTable, source: PathBuf, default_city: &str) -> Self {
        let mut state = AppState {
            dataset: EnrichedTable::default(),
            source,
            default_city: default_city.to_string(),
            selected: Selection::new(),
            filtered: EnrichedTable::default(),
            metric: MetricKind::Solar,
            month_order: MonthOrder::default(),
            malformed_policy: MalformedPolicy::default(),
            color_map: ColorMap::default(),
            frame: 0,
            playing: false,
            frame_interval: 0.8,
            last_step: 0.0,
            status_message: None,
        };
        state.set_dataset(dataset);
        state
    }

    /// Ingest a newly loaded dataset, reset the selection and colours.
    pub fn set_dataset(&mut self, dataset: EnrichedTable) {
        self.color_map = ColorMap::new(&dataset.entities);
        self.selected = default_selection(&dataset, &self.default_city);
        self.dataset = dataset;
        self.frame = 0;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `filtered` after a selection change.
    pub fn refilter(&mut self) {
        self.filtered = filter_by_entities(&self.dataset, &self.selected);
        log::debug!(
            "{} of {} rows visible for {} selected cities",
            self.filtered.len(),
            self.dataset.len(),
            self.selected.len()
        );
    }

    pub fn toggle_city(&mut self, city: &str) {
        if !self.selected.remove(city) {
            self.selected.insert(city.to_string());
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        self.selected = self.dataset.entities.iter().cloned().collect();
        self.refilter();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
        self.refilter();
    }

    /// Advance the map animation once `now` has passed the interval.
    /// Returns true when the frame changed.
    pub fn tick(&mut self, now: f64, n_frames: usize) -> bool {
        if !self.playing || n_frames == 0 || now - self.last_step < self.frame_interval {
            return false;
        }
        self.last_step = now;
        self.frame = (self.frame + 1) % n_frames;
        true
    }
}

/// `default_city` when the data has it, otherwise the first city.
fn default_selection(dataset: &EnrichedTable, default_city: &str) -> Selection {
    let pick = if dataset.entities.iter().any(|c| c == default_city) {
        Some(default_city.to_string())
    } else {
        dataset.entities.first().cloned()
    };
    pick.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builder::build;
    use crate::data::model::RawRecord;

    fn dataset() -> EnrichedTable {
        build(
            &[
                RawRecord::new("Oslo", 59.91, 10.75, "Jan", 150.0, 0.0, 25.0, 30.0, 5.0),
                RawRecord::new("Paris", 48.85, 2.35, "Jan", 100.0, 50.0, 20.0, 30.0, 40.0),
                RawRecord::new("Paris", 48.85, 2.35, "Feb", 90.0, 40.0, 20.0, 30.0, 60.0),
            ],
            MalformedPolicy::Reject,
        )
        .unwrap()
    }

    #[test]
    fn test_default_city_selected() {
        let state = AppState::new(dataset(), PathBuf::from("city_data.csv"), "Paris");
        assert_eq!(state.selected.len(), 1);
        assert!(state.selected.contains("Paris"));
        assert_eq!(state.filtered.len(), 2);
    }

    #[test]
    fn test_default_falls_back_to_first_city() {
        let state = AppState::new(dataset(), PathBuf::from("city_data.csv"), "Lisbon");
        assert!(state.selected.contains("Oslo"));
        assert_eq!(state.filtered.len(), 1);
    }

    #[test]
    fn test_toggle_and_select_none() {
        let mut state = AppState::new(dataset(), PathBuf::from("city_data.csv"), "Paris");
        state.toggle_city("Oslo");
        assert_eq!(state.filtered.len(), 3);
        state.toggle_city("Paris");
        assert_eq!(state.filtered.len(), 1);
        state.select_none();
        assert!(state.filtered.is_empty());
        state.select_all();
        assert_eq!(state.filtered.len(), 3);
        // the source table itself is untouched by filtering
        assert_eq!(state.dataset.len(), 3);
    }

    #[test]
    fn test_tick_wraps_frames() {
        let mut state = AppState::new(dataset(), PathBuf::from("city_data.csv"), "Paris");
        assert!(!state.tick(10.0, 2));
        state.playing = true;
        assert!(state.tick(10.0, 2));
        assert_eq!(state.frame, 1);
        assert!(!state.tick(10.1, 2));
        assert!(state.tick(11.0, 2));
        assert_eq!(state.frame, 0);
    }
}
