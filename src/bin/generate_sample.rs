use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use energy_load_explorer::data::model::{MONTHS, REQUIRED_COLUMNS};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Multiplicative jitter around 1.0
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + spread * (2.0 * self.next_f64() - 1.0)
    }
}

/// (name as written to the file, latitude, longitude, mean annual temperature °C)
const CITIES: [(&str, f64, f64, f64); 10] = [
    ("Paris", 48.85, 2.35, 12.5),
    ("\"Berlin\"", 52.52, 13.40, 10.0),
    ("Oslo", 59.91, 10.75, 6.0),
    ("Madrid", 40.42, -3.70, 15.0),
    ("Phoenix", 33.45, -112.07, 24.0),
    ("\"Toronto\"", 43.65, -79.38, 9.0),
    ("Singapore", 1.35, 103.82, 27.5),
    ("Sydney", -33.87, 151.21, 18.5),
    ("Cape Town", -33.92, 18.42, 17.0),
    ("Mumbai", 19.08, 72.88, 27.0),
];

/// 100 m² home, 50 m² of panels.
const FLOOR_AREA: f64 = 100.0;
const PANEL_AREA: f64 = 50.0;
const COMFORT_C: f64 = 20.0;

struct Row {
    city: String,
    lat: f64,
    lon: f64,
    month: String,
    values: [f64; 5],
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(city, lat, lon, mean_temp) in &CITIES {
        // Seasonal swing grows with latitude; southern hemisphere is shifted half a year.
        let amplitude = 2.0 + lat.abs() * 0.25;
        let phase = if lat < 0.0 { 0.0 } else { std::f64::consts::PI };
        for (m, month) in MONTHS.iter().enumerate() {
            let angle = 2.0 * std::f64::consts::PI * m as f64 / 12.0 + phase;
            let temp = mean_temp + amplitude * angle.cos();

            let heating = ((COMFORT_C - temp).max(0.0) * 0.09 * FLOOR_AREA * 30.0 / 24.0) * rng.jitter(0.1);
            let cooling = ((temp - 24.0).max(0.0) * 0.12 * FLOOR_AREA * 30.0 / 24.0) * rng.jitter(0.1);
            let water = 150.0 * (1.0 + (15.0 - temp).max(0.0) / 30.0) * rng.jitter(0.05);
            let appliance = 250.0 * rng.jitter(0.08);
            let daylight = 1.0 - (lat.abs() / 90.0) * 0.6 * (-angle).cos();
            let solar = (PANEL_AREA * 0.2 * 30.0 * 5.0 * daylight.max(0.1)) * rng.jitter(0.15);

            rows.push(Row {
                city: city.to_string(),
                lat,
                lon,
                month: month.to_string(),
                values: [heating, cooling, water, appliance, solar].map(|v| (v * 10.0).round() / 10.0),
            });
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    wtr.write_record(REQUIRED_COLUMNS)?;
    for row in rows {
        let mut record = vec![
            row.city.clone(),
            row.lat.to_string(),
            row.lon.to_string(),
            row.month.clone(),
        ];
        record.extend(row.values.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let fields: Vec<Field> = REQUIRED_COLUMNS
        .iter()
        .map(|&name| match name {
            "City" | "Month" => Field::new(name, DataType::Utf8, false),
            _ => Field::new(name, DataType::Float64, false),
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.city.as_str()))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.lat))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.lon))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.month.as_str()))),
    ];
    for i in 0..5 {
        columns.push(Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.values[i]))));
    }

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = "city_data.csv";
    write_csv(&rows, csv_path)?;

    let batch = to_batch(&rows)?;
    let parquet_path = "city_data.parquet";
    let file = std::fs::File::create(parquet_path).with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 3)])?);
    println!(
        "Wrote {} rows ({} cities x {} months) to {csv_path} and {parquet_path}",
        rows.len(),
        CITIES.len(),
        MONTHS.len()
    );
    Ok(())
}
