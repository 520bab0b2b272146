use crate::error::{DataError, DataResult};

use super::model::{EnrichedRecord, EnrichedTable, RawRecord};

// ---------------------------------------------------------------------------
// Malformed-row policy
// ---------------------------------------------------------------------------

/// What to do with a row that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MalformedPolicy {
    /// Abort the build on the first bad row.
    #[default]
    Reject,
    /// Drop the row with a warning and keep going.
    Skip,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Validate raw rows and derive total load and grid dependency.
///
/// Input order is kept; the distinct city list follows first appearance.
pub fn build(raw_rows: &[RawRecord], policy: MalformedPolicy) -> DataResult<EnrichedTable> {
    let mut records = Vec::with_capacity(raw_rows.len());
    let mut skipped = 0usize;

    for (row, raw) in raw_rows.iter().enumerate() {
        match enrich(row, raw) {
            Ok(rec) => records.push(rec),
            Err(e) if policy == MalformedPolicy::Skip => {
                log::warn!("Skipping {e}");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if skipped > 0 {
        log::warn!("{skipped} of {} rows skipped as malformed", raw_rows.len());
    }

    Ok(EnrichedTable::from_records(records))
}

/// Total electrical load: the sum of the four load categories.
pub fn total_electrical_load(heating: f64, cooling: f64, water_heating: f64, appliance: f64) -> f64 {
    heating + cooling + water_heating + appliance
}

/// Load left after solar self-consumption. Surplus earns no credit.
pub fn grid_dependency(total_load: f64, solar: f64) -> f64 {
    (total_load - solar).max(0.0)
}

/// Strip quote characters a source may wrap names in.
pub fn normalize_entity(name: &str) -> String {
    name.replace('"', "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

fn enrich(row: usize, raw: &RawRecord) -> DataResult<EnrichedRecord> {
    let city = normalize_entity(&raw.city);
    if city.is_empty() {
        return Err(DataError::malformed(row, "missing City"));
    }
    let month = raw.month.trim().to_string();
    if month.is_empty() {
        return Err(DataError::malformed(row, "missing Month"));
    }

    let lat = require(row, "Lat", raw.lat)?;
    let lon = require(row, "Lon", raw.lon)?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(DataError::malformed(row, format!("Lat {lat} out of range")));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(DataError::malformed(row, format!("Lon {lon} out of range")));
    }

    let heating = measurement(row, "MonthHeat", raw.heating)?;
    let cooling = measurement(row, "MonthCold", raw.cooling)?;
    let water_heating = measurement(row, "MonthWater", raw.water_heating)?;
    let appliance = measurement(row, "MonthElec", raw.appliance)?;
    let solar = measurement(row, "MonthSolar", raw.solar)?;

    let total = total_electrical_load(heating, cooling, water_heating, appliance);

    Ok(EnrichedRecord {
        city,
        lat,
        lon,
        month,
        heating,
        cooling,
        water_heating,
        appliance,
        total_electrical_load: total,
        solar,
        grid_dependency: grid_dependency(total, solar),
    })
}

fn require(row: usize, col: &str, value: Option<f64>) -> DataResult<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(DataError::malformed(row, format!("{col} is not finite ({v})"))),
        None => Err(DataError::malformed(row, format!("missing or non-numeric {col}"))),
    }
}

fn measurement(row: usize, col: &str, value: Option<f64>) -> DataResult<f64> {
    let v = require(row, col, value)?;
    if v < 0.0 {
        log::warn!("Row {row}: negative {col} ({v})");
    }
    Ok(v)
}
