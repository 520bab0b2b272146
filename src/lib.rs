//! Per-city monthly energy loads: load, enrich, filter, export and view.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use data::builder::{build, MalformedPolicy};
pub use data::filter::{filter_by_entities, project_metric, project_metric_named, Selection};
pub use data::model::{EnrichedRecord, EnrichedTable, MetricKind, MetricTable, MonthOrder, RawRecord};
pub use error::{DataError, DataResult};
