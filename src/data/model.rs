use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Month labels
// ---------------------------------------------------------------------------

/// Calendar abbreviations in canonical order.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Position of a month label in the calendar, case-insensitive.
pub fn canonical_month_index(label: &str) -> Option<usize> {
    MONTHS.iter().position(|m| m.eq_ignore_ascii_case(label))
}

/// How month labels are ordered on chart axes and animation frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MonthOrder {
    /// Jan..Dec; labels outside the calendar follow, sorted lexically.
    #[default]
    Canonical,
    /// Order of first appearance in the table.
    Arrival,
    /// Plain string order.
    Lexical,
}

impl MonthOrder {
    pub const ALL: [MonthOrder; 3] = [MonthOrder::Canonical, MonthOrder::Arrival, MonthOrder::Lexical];

    pub fn label(self) -> &'static str {
        match self {
            MonthOrder::Canonical => "Calendar",
            MonthOrder::Arrival => "As in source",
            MonthOrder::Lexical => "Alphabetical",
        }
    }

    /// Compare two labels. `Arrival` has no intrinsic order and reports `Equal`,
    /// so a stable sort keeps the incoming sequence.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            MonthOrder::Canonical => {
                let key = |m: &str| canonical_month_index(m).unwrap_or(MONTHS.len());
                key(a).cmp(&key(b)).then_with(|| a.cmp(b))
            }
            MonthOrder::Arrival => Ordering::Equal,
            MonthOrder::Lexical => a.cmp(b),
        }
    }

    /// Sort labels given in first-appearance order.
    pub fn sort(self, mut months: Vec<String>) -> Vec<String> {
        months.sort_by(|a, b| self.compare(a, b));
        months
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one row as read from the source
// ---------------------------------------------------------------------------

/// Column names the source must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "City",
    "Lat",
    "Lon",
    "Month",
    "MonthHeat",
    "MonthCold",
    "MonthWater",
    "MonthElec",
    "MonthSolar",
];

/// One input row before validation. Numeric cells that are empty or not a
/// number arrive as `None` and are rejected by the builder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "Lat", default, deserialize_with = "csv::invalid_option")]
    pub lat: Option<f64>,
    #[serde(rename = "Lon", default, deserialize_with = "csv::invalid_option")]
    pub lon: Option<f64>,
    #[serde(rename = "Month", default)]
    pub month: String,
    #[serde(rename = "MonthHeat", default, deserialize_with = "csv::invalid_option")]
    pub heating: Option<f64>,
    #[serde(rename = "MonthCold", default, deserialize_with = "csv::invalid_option")]
    pub cooling: Option<f64>,
    #[serde(rename = "MonthWater", default, deserialize_with = "csv::invalid_option")]
    pub water_heating: Option<f64>,
    #[serde(rename = "MonthElec", default, deserialize_with = "csv::invalid_option")]
    pub appliance: Option<f64>,
    #[serde(rename = "MonthSolar", default, deserialize_with = "csv::invalid_option")]
    pub solar: Option<f64>,
}

impl RawRecord {
    /// Fully populated record, mostly for fixtures.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        city: &str,
        lat: f64,
        lon: f64,
        month: &str,
        heating: f64,
        cooling: f64,
        water_heating: f64,
        appliance: f64,
        solar: f64,
    ) -> Self {
        RawRecord {
            city: city.to_string(),
            lat: Some(lat),
            lon: Some(lon),
            month: month.to_string(),
            heating: Some(heating),
            cooling: Some(cooling),
            water_heating: Some(water_heating),
            appliance: Some(appliance),
            solar: Some(solar),
        }
    }
}

// ---------------------------------------------------------------------------
// EnrichedRecord – validated row with derived columns
// ---------------------------------------------------------------------------

/// A validated row plus total load and grid dependency.
///
/// Field names serialize to the column headings used in the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Lat")]
    pub lat: f64,
    #[serde(rename = "Lon")]
    pub lon: f64,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Heating Load (kWh)")]
    pub heating: f64,
    #[serde(rename = "Cooling Load (kWh)")]
    pub cooling: f64,
    #[serde(rename = "Water Heating (kWh)")]
    pub water_heating: f64,
    #[serde(rename = "Electrical Appliance (kWh)")]
    pub appliance: f64,
    #[serde(rename = "Total Electrical Load (kWh)")]
    pub total_electrical_load: f64,
    #[serde(rename = "Solar Energy Production (kWh)")]
    pub solar: f64,
    #[serde(rename = "Grid Dependency (kWh)")]
    pub grid_dependency: f64,
}

// ---------------------------------------------------------------------------
// EnrichedTable – the complete built dataset
// ---------------------------------------------------------------------------

/// Enriched rows in source order plus the distinct city names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedTable {
    pub records: Vec<EnrichedRecord>,
    /// Distinct city names in first-appearance order.
    pub entities: Vec<String>,
}

impl EnrichedTable {
    /// Wrap rows and index the distinct city names.
    pub fn from_records(records: Vec<EnrichedRecord>) -> Self {
        let entities = distinct(records.iter().map(|r| r.city.as_str()));
        EnrichedTable { records, entities }
    }

    /// Distinct month labels in first-appearance order.
    pub fn months(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.month.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// MetricKind – the selectable columns
// ---------------------------------------------------------------------------

/// The seven measurement and derived columns a view can be driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Heating,
    Cooling,
    WaterHeating,
    Appliance,
    TotalElectrical,
    Solar,
    GridDependency,
}

impl MetricKind {
    /// Fixed iteration order for the per-metric charts.
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Heating,
        MetricKind::Cooling,
        MetricKind::WaterHeating,
        MetricKind::Appliance,
        MetricKind::TotalElectrical,
        MetricKind::Solar,
        MetricKind::GridDependency,
    ];

    /// Column heading, as shown in the viewer and the export.
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Heating => "Heating Load (kWh)",
            MetricKind::Cooling => "Cooling Load (kWh)",
            MetricKind::WaterHeating => "Water Heating (kWh)",
            MetricKind::Appliance => "Electrical Appliance (kWh)",
            MetricKind::TotalElectrical => "Total Electrical Load (kWh)",
            MetricKind::Solar => "Solar Energy Production (kWh)",
            MetricKind::GridDependency => "Grid Dependency (kWh)",
        }
    }

    /// Short key accepted on the command line.
    pub fn key(self) -> &'static str {
        match self {
            MetricKind::Heating => "heating",
            MetricKind::Cooling => "cooling",
            MetricKind::WaterHeating => "water-heating",
            MetricKind::Appliance => "appliance",
            MetricKind::TotalElectrical => "total-electrical",
            MetricKind::Solar => "solar",
            MetricKind::GridDependency => "grid-dependency",
        }
    }

    /// Read this metric off a record.
    pub fn value(self, rec: &EnrichedRecord) -> f64 {
        match self {
            MetricKind::Heating => rec.heating,
            MetricKind::Cooling => rec.cooling,
            MetricKind::WaterHeating => rec.water_heating,
            MetricKind::Appliance => rec.appliance,
            MetricKind::TotalElectrical => rec.total_electrical_load,
            MetricKind::Solar => rec.solar,
            MetricKind::GridDependency => rec.grid_dependency,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricKind {
    type Err = DataError;

    /// Accepts the short key or the column heading, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MetricKind::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s) || m.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| DataError::UnknownMetric(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MetricTable – one metric projected out of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub city: String,
    pub month: String,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

/// Reduced table driving the map and single-metric series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    pub metric: MetricKind,
    pub rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
