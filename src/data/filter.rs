use std::collections::{BTreeSet, HashMap};

use crate::error::DataResult;

use super::model::{EnrichedTable, MetricKind, MetricRow, MetricTable, MonthOrder};

// ---------------------------------------------------------------------------
// Entity selection
// ---------------------------------------------------------------------------

/// Selected city names. An empty set selects nothing.
pub type Selection = BTreeSet<String>;

/// Rows whose city is in `selected`, in source order.
///
/// Names that match no row are ignored; an empty selection yields an empty
/// table.
pub fn filter_by_entities(table: &EnrichedTable, selected: &Selection) -> EnrichedTable {
    if selected.is_empty() {
        return EnrichedTable::default();
    }
    let records = table
        .records
        .iter()
        .filter(|rec| selected.contains(&rec.city))
        .cloned()
        .collect();
    EnrichedTable::from_records(records)
}

// ---------------------------------------------------------------------------
// Metric projection
// ---------------------------------------------------------------------------

/// Reduce every row to city, month, position and one metric value.
pub fn project_metric(table: &EnrichedTable, metric: MetricKind) -> MetricTable {
    let rows = table
        .records
        .iter()
        .map(|rec| MetricRow {
            city: rec.city.clone(),
            month: rec.month.clone(),
            lat: rec.lat,
            lon: rec.lon,
            value: metric.value(rec),
        })
        .collect();
    MetricTable { metric, rows }
}

/// [`project_metric`] for a metric given by name; fails with `UnknownMetric`.
pub fn project_metric_named(table: &EnrichedTable, metric: &str) -> DataResult<MetricTable> {
    Ok(project_metric(table, metric.parse()?))
}

/// Min and max of a metric, `None` on an empty table.
pub fn metric_range(table: &EnrichedTable, metric: MetricKind) -> Option<(f64, f64)> {
    table.records.iter().map(|rec| metric.value(rec)).fold(None, |acc, v| {
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        })
    })
}

// ---------------------------------------------------------------------------
// Animation frames
// ---------------------------------------------------------------------------

/// Projected rows sharing one month label.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthFrame {
    pub month: String,
    pub rows: Vec<MetricRow>,
}

/// Group a projection by month, frames ordered by `order`.
pub fn month_frames(projection: &MetricTable, order: MonthOrder) -> Vec<MonthFrame> {
    let mut frames: Vec<MonthFrame> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in &projection.rows {
        let slot = *index.entry(row.month.as_str()).or_insert_with(|| {
            frames.push(MonthFrame {
                month: row.month.clone(),
                rows: Vec::new(),
            });
            frames.len() - 1
        });
        frames[slot].rows.push(row.clone());
    }

    frames.sort_by(|a, b| order.compare(&a.month, &b.month));
    frames
}

// ---------------------------------------------------------------------------
// Per-city time series
// ---------------------------------------------------------------------------

/// One city's values for a metric, `(month, value)` in month order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub city: String,
    pub points: Vec<(String, f64)>,
}

/// One series per city of `table` (first-appearance order) for `metric`.
pub fn entity_series(table: &EnrichedTable, metric: MetricKind, order: MonthOrder) -> Vec<EntitySeries> {
    table
        .entities
        .iter()
        .map(|city| {
            let mut points: Vec<(String, f64)> = table
                .records
                .iter()
                .filter(|rec| &rec.city == city)
                .map(|rec| (rec.month.clone(), metric.value(rec)))
                .collect();
            points.sort_by(|a, b| order.compare(&a.0, &b.0));
            EntitySeries {
                city: city.clone(),
                points,
            }
        })
        .collect()
}
