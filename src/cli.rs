//! Startup options for the explorer

use std::path::PathBuf;

use clap::Parser;

use crate::data::builder::MalformedPolicy;
use crate::data::model::{MetricKind, MonthOrder};

#[derive(Parser, Debug)]
#[command(name = "energy-load-explorer")]
#[command(version)]
#[command(about = "Explore monthly heating, cooling and solar loads per city", long_about = None)]
pub struct Cli {
    /// City data file (.csv, .json or .parquet)
    #[arg(value_name = "DATA", default_value = "city_data.csv")]
    pub data: PathBuf,

    /// Metric shown on the map at startup (e.g. solar, grid-dependency)
    #[arg(short, long, value_name = "METRIC", default_value = "solar")]
    pub metric: MetricKind,

    /// City selected at startup; falls back to the first city in the data
    #[arg(long = "default-city", value_name = "NAME", default_value = "Paris")]
    pub default_city: String,

    /// Month ordering for chart axes and map frames
    #[arg(long = "month-order", value_enum, default_value = "canonical")]
    pub month_order: MonthOrder,

    /// Reject the whole file on a bad row, or skip the row with a warning
    #[arg(long = "on-malformed", value_enum, default_value = "reject")]
    pub on_malformed: MalformedPolicy,

    /// Map animation step in milliseconds
    #[arg(long = "frame-interval-ms", value_name = "MS", default_value = "800")]
    pub frame_interval_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["energy-load-explorer"]);
        assert_eq!(cli.data, PathBuf::from("city_data.csv"));
        assert_eq!(cli.metric, MetricKind::Solar);
        assert_eq!(cli.default_city, "Paris");
        assert_eq!(cli.month_order, MonthOrder::Canonical);
        assert_eq!(cli.on_malformed, MalformedPolicy::Reject);
        assert_eq!(cli.frame_interval_ms, 800);
    }

    #[test]
    fn test_options() {
        let cli = Cli::parse_from([
            "energy-load-explorer",
            "loads.parquet",
            "--metric",
            "grid-dependency",
            "--month-order",
            "arrival",
            "--on-malformed",
            "skip",
        ]);
        assert_eq!(cli.data, PathBuf::from("loads.parquet"));
        assert_eq!(cli.metric, MetricKind::GridDependency);
        assert_eq!(cli.month_order, MonthOrder::Arrival);
        assert_eq!(cli.on_malformed, MalformedPolicy::Skip);
    }

    #[test]
    fn test_unknown_metric_rejected() {
        assert!(Cli::try_parse_from(["energy-load-explorer", "--metric", "wind"]).is_err());
    }
}
