use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::error::{DataError, DataResult};

use super::builder::{self, MalformedPolicy};
use super::model::{EnrichedTable, RawRecord, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and build the enriched table in one step.
pub fn load_table(path: &Path, policy: MalformedPolicy) -> DataResult<EnrichedTable> {
    let raw = load_file(path, policy)?;
    let table = builder::build(&raw, policy)?;
    log::info!(
        "Loaded {} rows for {} cities from {}",
        table.len(),
        table.entities.len(),
        path.display()
    );
    Ok(table)
}

/// Read raw city rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the nine required columns
/// * `.json`    – `[{ "City": "Paris", "Lat": 48.85, ... }, ...]`
/// * `.parquet` – flat columns, text for City/Month, numbers for the rest
///
/// Rows that cannot be parsed at all (ragged CSV lines, non-object JSON
/// elements) are subject to `policy` just like rows the builder rejects.
pub fn load_file(path: &Path, policy: MalformedPolicy) -> DataResult<Vec<RawRecord>> {
    if !path.is_file() {
        return Err(DataError::unavailable(path, "file not found"));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, policy),
        "json" => load_json(path, policy),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::unavailable(
            path,
            format!("unsupported file extension: .{other}"),
        )),
    }
}

/// Fail when any required column is absent. Extra columns are fine.
fn check_columns<'a>(path: &Path, present: impl IntoIterator<Item = &'a str>) -> DataResult<()> {
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::unavailable(
            path,
            format!("missing columns: {}", missing.join(", ")),
        ))
    }
}

/// Gather parsed rows, dropping unparseable ones under `MalformedPolicy::Skip`.
fn collect_rows(
    rows: impl Iterator<Item = DataResult<RawRecord>>,
    policy: MalformedPolicy,
) -> DataResult<Vec<RawRecord>> {
    let mut kept = Vec::new();
    for result in rows {
        match result {
            Ok(rec) => kept.push(rec),
            Err(e @ DataError::MalformedRecord { .. }) if policy == MalformedPolicy::Skip => {
                log::warn!("Skipping {e}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(kept)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, policy: MalformedPolicy) -> DataResult<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::unavailable(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::unavailable(path, format!("reading CSV headers: {e}")))?
        .clone();
    check_columns(path, headers.iter())?;

    let rows = reader
        .into_deserialize::<RawRecord>()
        .enumerate()
        .map(|(row, result)| result.map_err(|e| DataError::malformed(row, e.to_string())));
    collect_rows(rows, policy)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path, policy: MalformedPolicy) -> DataResult<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::unavailable(path, e))?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| DataError::unavailable(path, format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::unavailable(path, "expected top-level JSON array"))?;

    // The first object stands in for the header row.
    if let Some(first) = records.first() {
        let obj = first
            .as_object()
            .ok_or_else(|| DataError::unavailable(path, "first record is not a JSON object"))?;
        check_columns(path, obj.keys().map(String::as_str))?;
    }

    let rows = records.iter().enumerate().map(|(row, rec)| {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::malformed(row, "not a JSON object"))?;
        // Numbers given as strings parse; missing keys and anything else are left for the builder to reject.
        let normalized: serde_json::Map<String, JsonValue> = obj
            .iter()
            .map(|(k, v)| (k.clone(), json_cell(k, v)))
            .collect();
        serde_json::from_value(JsonValue::Object(normalized)).map_err(|e| DataError::malformed(row, e.to_string()))
    });
    collect_rows(rows, policy)
}

fn json_cell(key: &str, val: &JsonValue) -> JsonValue {
    match (key, val) {
        ("City" | "Month", JsonValue::String(_)) => val.clone(),
        ("City" | "Month", JsonValue::Null) => JsonValue::String(String::new()),
        ("City" | "Month", other) => JsonValue::String(other.to_string()),
        (_, JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        _ => val.clone(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per required field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> DataResult<Vec<RawRecord>> {
    let file = std::fs::File::open(path).map_err(|e| DataError::unavailable(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::unavailable(path, format!("reading parquet metadata: {e}")))?;
    // Checked on the file schema so that an empty file with the wrong columns still fails.
    check_columns(path, builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder
        .build()
        .map_err(|e| DataError::unavailable(path, format!("building parquet reader: {e}")))?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| DataError::unavailable(path, format!("reading record batch: {e}")))?;

        let city = text_column(path, &batch, "City")?;
        let lat = column(path, &batch, "Lat")?;
        let lon = column(path, &batch, "Lon")?;
        let month = text_column(path, &batch, "Month")?;
        let heat = column(path, &batch, "MonthHeat")?;
        let cold = column(path, &batch, "MonthCold")?;
        let water = column(path, &batch, "MonthWater")?;
        let elec = column(path, &batch, "MonthElec")?;
        let solar = column(path, &batch, "MonthSolar")?;

        for row in 0..batch.num_rows() {
            let global_row = rows.len();
            let number = |col: &Arc<dyn Array>, name: &str| {
                numeric_at(col, row).map_err(|reason| {
                    DataError::unavailable(path, format!("column {name} (row {global_row}): {reason}"))
                })
            };
            rows.push(RawRecord {
                city: text_at(&city, row).unwrap_or_default(),
                lat: number(lat, "Lat")?,
                lon: number(lon, "Lon")?,
                month: text_at(&month, row).unwrap_or_default(),
                heating: number(heat, "MonthHeat")?,
                cooling: number(cold, "MonthCold")?,
                water_heating: number(water, "MonthWater")?,
                appliance: number(elec, "MonthElec")?,
                solar: number(solar, "MonthSolar")?,
            });
        }
    }

    Ok(rows)
}

// -- Arrow helpers --

fn column<'a>(path: &Path, batch: &'a RecordBatch, name: &str) -> DataResult<&'a ArrayRef> {
    batch
        .schema()
        .index_of(name)
        .map(|i| batch.column(i))
        .map_err(|e| DataError::unavailable(path, e))
}

/// A text column as `Utf8`. Large, view and dictionary-encoded strings
/// (pandas categoricals) are cast; other types are a schema mismatch.
fn text_column(path: &Path, batch: &RecordBatch, name: &str) -> DataResult<ArrayRef> {
    let col = column(path, batch, name)?;
    match col.data_type() {
        DataType::Utf8 => Ok(col.clone()),
        DataType::LargeUtf8 | DataType::Utf8View => cast_to_utf8(path, name, col),
        DataType::Dictionary(_, value)
            if matches!(value.as_ref(), DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View) =>
        {
            cast_to_utf8(path, name, col)
        }
        other => Err(DataError::unavailable(
            path,
            format!("column {name}: unsupported type {other:?}, expected text"),
        )),
    }
}

fn cast_to_utf8(path: &Path, name: &str, col: &ArrayRef) -> DataResult<ArrayRef> {
    cast(col, &DataType::Utf8).map_err(|e| DataError::unavailable(path, format!("column {name}: {e}")))
}

fn text_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|s| s.value(row).to_string())
}

/// Numeric cell as `f64`; `Ok(None)` for nulls and unparseable text.
fn numeric_at(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>, String> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        DataType::Utf8 => {
            return Ok(text_at(col, row).and_then(|s| s.trim().parse().ok()));
        }
        DataType::LargeUtf8 => {
            let text = any
                .downcast_ref::<LargeStringArray>()
                .map(|a| a.value(row).trim().parse().ok());
            return text.ok_or_else(|| "unexpected array for LargeUtf8".to_string());
        }
        other => return Err(format!("unsupported type {other:?}")),
    };
    value
        .map(Some)
        .ok_or_else(|| format!("unexpected array for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::DictionaryArray;
    use arrow::datatypes::{Field, Int32Type, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    const HEADER: &str = "City,Lat,Lon,Month,MonthHeat,MonthCold,MonthWater,MonthElec,MonthSolar";

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_csv_loads_and_builds() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "city_data.csv",
            &format!(
                "{HEADER}\nParis,48.85,2.35,Jan,100,50,20,30,40\n\"\"\"Berlin\"\"\",52.52,13.40,Jan,1,2,3,4,5\n"
            ),
        );
        let table = load_table(&path, MalformedPolicy::Reject).unwrap();
        assert_eq!(table.entities, vec!["Paris", "Berlin"]);
        assert_eq!(table.records[0].grid_dependency, 160.0);
    }

    #[test]
    fn test_csv_column_order_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "reordered.csv",
            "Month,City,MonthSolar,MonthElec,MonthWater,MonthCold,MonthHeat,Lon,Lat,Extra\n\
             Jul,Phoenix,300,30,20,200,10,-112.07,33.45,ignored\n",
        );
        let rows = load_file(&path, MalformedPolicy::Reject).unwrap();
        assert_eq!(
            rows[0],
            RawRecord::new("Phoenix", 33.45, -112.07, "Jul", 10.0, 200.0, 20.0, 30.0, 300.0)
        );
    }

    #[test]
    fn test_csv_missing_column_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv", "City,Lat,Lon,Month\nParis,1,2,Jan\n");
        match load_file(&path, MalformedPolicy::Reject) {
            Err(DataError::SourceUnavailable { reason, .. }) => assert!(reason.contains("MonthHeat")),
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_csv_blank_cell_becomes_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "blank.csv",
            &format!("{HEADER}\nParis,48.85,2.35,Jan,100,,20,30,40\n"),
        );
        let rows = load_file(&path, MalformedPolicy::Reject).unwrap();
        assert_eq!(rows[0].cooling, None);
        assert!(matches!(
            load_table(&path, MalformedPolicy::Reject),
            Err(DataError::MalformedRecord { row: 0, .. })
        ));
        assert!(load_table(&path, MalformedPolicy::Skip).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_and_unknown_extension() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_file(&dir.path().join("absent.csv"), MalformedPolicy::Reject),
            Err(DataError::SourceUnavailable { .. })
        ));
        let path = write_file(&dir, "data.xlsx", "");
        assert!(matches!(
            load_file(&path, MalformedPolicy::Reject),
            Err(DataError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_json_records() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "city_data.json",
            r#"[{"City":"Paris","Lat":48.85,"Lon":2.35,"Month":"Jan",
                 "MonthHeat":100,"MonthCold":"50","MonthWater":20,"MonthElec":30,"MonthSolar":null}]"#,
        );
        let rows = load_file(&path, MalformedPolicy::Reject).unwrap();
        assert_eq!(rows[0].cooling, Some(50.0));
        assert_eq!(rows[0].solar, None);
    }

    fn write_parquet(path: &Path, schema: Arc<Schema>, batches: &[RecordBatch]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        writer.close().unwrap();
    }

    /// Schema with the given City/Month types and Float64 for the rest.
    fn city_schema(text_type: DataType) -> Arc<Schema> {
        let fields: Vec<Field> = REQUIRED_COLUMNS
            .iter()
            .map(|&name| match name {
                "City" | "Month" => Field::new(name, text_type.clone(), false),
                _ => Field::new(name, DataType::Float64, false),
            })
            .collect();
        Arc::new(Schema::new(fields))
    }

    fn numeric_columns(values: [f64; 7]) -> Vec<ArrayRef> {
        values
            .iter()
            .map(|v| Arc::new(Float64Array::from(vec![*v])) as ArrayRef)
            .collect()
    }

    #[test]
    fn test_csv_ragged_row_policy() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "ragged.csv",
            &format!("{HEADER}\nParis,48.85,2.35,Jan,100,50,20,30,40\nOslo,59.9,10.7,Jan,1,2\n"),
        );

        assert!(matches!(
            load_table(&path, MalformedPolicy::Reject),
            Err(DataError::MalformedRecord { row: 1, .. })
        ));

        let table = load_table(&path, MalformedPolicy::Skip).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.entities, vec!["Paris"]);
    }

    #[test]
    fn test_json_non_object_element_policy() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "mixed.json",
            r#"[{"City":"Paris","Lat":48.85,"Lon":2.35,"Month":"Jan",
                 "MonthHeat":100,"MonthCold":50,"MonthWater":20,"MonthElec":30,"MonthSolar":40},
                42]"#,
        );

        assert!(matches!(
            load_file(&path, MalformedPolicy::Reject),
            Err(DataError::MalformedRecord { row: 1, .. })
        ));
        let table = load_table(&path, MalformedPolicy::Skip).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].grid_dependency, 160.0);
    }

    #[test]
    fn test_parquet_empty_file_with_wrong_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Float64, false)]));
        write_parquet(&path, schema, &[]);

        match load_file(&path, MalformedPolicy::Skip) {
            Err(DataError::SourceUnavailable { reason, .. }) => assert!(reason.contains("City")),
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_parquet_empty_file_with_city_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.parquet");
        write_parquet(&path, city_schema(DataType::Utf8), &[]);
        assert!(load_file(&path, MalformedPolicy::Reject).unwrap().is_empty());
    }

    #[test]
    fn test_parquet_dictionary_text_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categorical.parquet");
        let schema = city_schema(DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)));

        let city: DictionaryArray<Int32Type> = vec!["Paris"].into_iter().collect();
        let month: DictionaryArray<Int32Type> = vec!["Jan"].into_iter().collect();
        let numbers = numeric_columns([48.85, 2.35, 100.0, 50.0, 20.0, 30.0, 40.0]);
        let columns: Vec<ArrayRef> = vec![
            Arc::new(city),
            numbers[0].clone(),
            numbers[1].clone(),
            Arc::new(month),
            numbers[2].clone(),
            numbers[3].clone(),
            numbers[4].clone(),
            numbers[5].clone(),
            numbers[6].clone(),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        write_parquet(&path, schema, &[batch]);

        let table = load_table(&path, MalformedPolicy::Reject).unwrap();
        assert_eq!(table.entities, vec!["Paris"]);
        assert_eq!(table.records[0].month, "Jan");
        assert_eq!(table.records[0].grid_dependency, 160.0);
    }

    #[test]
    fn test_parquet_non_text_city_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numeric_city.parquet");
        let schema = city_schema(DataType::Int64);
        let numbers = numeric_columns([48.85, 2.35, 100.0, 50.0, 20.0, 30.0, 40.0]);
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![7])),
            numbers[0].clone(),
            numbers[1].clone(),
            Arc::new(Int64Array::from(vec![1])),
            numbers[2].clone(),
            numbers[3].clone(),
            numbers[4].clone(),
            numbers[5].clone(),
            numbers[6].clone(),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        write_parquet(&path, schema, &[batch]);

        match load_file(&path, MalformedPolicy::Skip) {
            Err(DataError::SourceUnavailable { reason, .. }) => assert!(reason.contains("City")),
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_parquet_flat_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("city_data.parquet");

        let mut fields = vec![
            Field::new("City", DataType::Utf8, false),
            Field::new("Lat", DataType::Float64, false),
            Field::new("Lon", DataType::Float64, false),
            Field::new("Month", DataType::Utf8, false),
        ];
        for name in &REQUIRED_COLUMNS[4..] {
            fields.push(Field::new(*name, DataType::Int64, true));
        }
        let schema = Arc::new(Schema::new(fields));
        let mut columns: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(vec!["Paris"])),
            Arc::new(Float64Array::from(vec![48.85])),
            Arc::new(Float64Array::from(vec![2.35])),
            Arc::new(StringArray::from(vec!["Jan"])),
        ];
        for v in [Some(100), Some(50), Some(20), Some(30), None] {
            columns.push(Arc::new(Int64Array::from(vec![v])));
        }
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        write_parquet(&path, schema, &[batch]);

        let rows = load_file(&path, MalformedPolicy::Reject).unwrap();
        assert_eq!(rows[0].city, "Paris");
        assert_eq!(rows[0].heating, Some(100.0));
        assert_eq!(rows[0].solar, None);
    }
}
