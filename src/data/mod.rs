/// Data layer: core types, loading, building, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  builder  │  validate, strip quotes, derive total load + grid dependency
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ EnrichedTable │  Vec<EnrichedRecord>, distinct cities
///   └──────────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  filter   │   │  export   │  CSV download
///   └──────────┘   └──────────┘
///   city subset, metric projection, month frames, series
/// ```

pub mod builder;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
