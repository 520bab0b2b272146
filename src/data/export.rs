use std::io::{Read, Write};
use std::path::Path;

use crate::error::{DataError, DataResult};

use super::model::{EnrichedRecord, EnrichedTable};

/// Suggested name for the downloaded file.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_climate_loads.csv";

/// Write rows as CSV with one header line. Values are written as computed.
pub fn write_csv<W: Write>(table: &EnrichedTable, writer: W) -> DataResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if table.is_empty() {
        // serialize() emits the header with the first record only
        wtr.write_record(HEADER).map_err(export_err)?;
    }
    for rec in &table.records {
        wtr.serialize(rec).map_err(export_err)?;
    }
    wtr.flush().map_err(|e| DataError::Export(e.to_string()))
}

/// The export as bytes, ready to hand to a save dialog.
pub fn to_csv_bytes(table: &EnrichedTable) -> DataResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Write the export to `path`.
pub fn save_csv(table: &EnrichedTable, path: &Path) -> DataResult<()> {
    let file = std::fs::File::create(path).map_err(|e| DataError::Export(format!("{}: {e}", path.display())))?;
    write_csv(table, file)?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Parse an export back into records.
pub fn read_csv<R: Read>(reader: R) -> DataResult<Vec<EnrichedRecord>> {
    csv::Reader::from_reader(reader)
        .into_deserialize()
        .enumerate()
        .map(|(row, result)| result.map_err(|e| DataError::malformed(row, e.to_string())))
        .collect()
}

const HEADER: [&str; 11] = [
    "City",
    "Lat",
    "Lon",
    "Month",
    "Heating Load (kWh)",
    "Cooling Load (kWh)",
    "Water Heating (kWh)",
    "Electrical Appliance (kWh)",
    "Total Electrical Load (kWh)",
    "Solar Energy Production (kWh)",
    "Grid Dependency (kWh)",
];

fn export_err(e: csv::Error) -> DataError {
    DataError::Export(e.to_string())
}
