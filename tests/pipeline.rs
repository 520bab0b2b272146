use std::io::Write;

use energy_load_explorer::data::export::{read_csv, to_csv_bytes};
use energy_load_explorer::data::filter::{entity_series, month_frames};
use energy_load_explorer::data::loader::load_table;
use energy_load_explorer::{
    filter_by_entities, project_metric, project_metric_named, DataError, MalformedPolicy, MetricKind, MonthOrder,
    Selection,
};

const CITY_DATA: &str = "\
City,Lat,Lon,Month,MonthHeat,MonthCold,MonthWater,MonthElec,MonthSolar
Paris,48.85,2.35,Feb,90,40,20,30,60
Paris,48.85,2.35,Jan,100,50,20,30,40
Phoenix,33.45,-112.07,Jul,10,200,20,30,300
\"\"\"Berlin\"\"\",52.52,13.4,Jan,180,0,25,30,10
Phoenix,33.45,-112.07,Jan,15,5,18,30,120
";

fn load() -> energy_load_explorer::EnrichedTable {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("city_data.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(CITY_DATA.as_bytes())
        .unwrap();
    load_table(&path, MalformedPolicy::Reject).unwrap()
}

fn select(names: &[&str]) -> Selection {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_load_and_enrich() {
    let table = load();
    assert_eq!(table.len(), 5);
    assert_eq!(table.entities, vec!["Paris", "Phoenix", "Berlin"]);

    let paris_jan = &table.records[1];
    assert_eq!(paris_jan.total_electrical_load, 200.0);
    assert_eq!(paris_jan.grid_dependency, 160.0);

    let phoenix_jul = &table.records[2];
    assert_eq!(phoenix_jul.total_electrical_load, 260.0);
    assert_eq!(phoenix_jul.grid_dependency, 0.0);

    for rec in &table.records {
        let total = rec.heating + rec.cooling + rec.water_heating + rec.appliance;
        assert!((rec.total_electrical_load - total).abs() < 1e-9);
        assert!((rec.grid_dependency - (total - rec.solar).max(0.0)).abs() < 1e-9);
    }
}

#[test]
fn test_selection_then_series() {
    let table = load();
    let filtered = filter_by_entities(&table, &select(&["Phoenix", "Nonexistent"]));
    assert_eq!(filtered.len(), 2);

    let series = entity_series(&filtered, MetricKind::Solar, MonthOrder::Canonical);
    assert_eq!(series.len(), 1);
    let months: Vec<&str> = series[0].points.iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(months, vec!["Jan", "Jul"]);

    assert!(filter_by_entities(&table, &Selection::new()).is_empty());
    assert!(filter_by_entities(&table, &select(&["Nonexistent"])).is_empty());
}

#[test]
fn test_map_projection_frames() {
    let table = load();
    for kind in MetricKind::ALL {
        assert_eq!(project_metric(&table, kind).len(), table.len());
    }
    let grid = project_metric_named(&table, "grid-dependency").unwrap();
    let frames = month_frames(&grid, MonthOrder::Canonical);
    let months: Vec<&str> = frames.iter().map(|f| f.month.as_str()).collect();
    assert_eq!(months, vec!["Jan", "Feb", "Jul"]);
    assert_eq!(frames[0].rows.len(), 3);

    assert!(matches!(
        project_metric_named(&table, "humidity"),
        Err(DataError::UnknownMetric(_))
    ));
}

#[test]
fn test_export_round_trip() {
    let table = load();
    let filtered = filter_by_entities(&table, &select(&["Berlin", "Paris"]));
    let bytes = to_csv_bytes(&filtered).unwrap();
    let parsed = read_csv(bytes.as_slice()).unwrap();
    assert_eq!(parsed, filtered.records);
    assert_eq!(parsed[2].city, "Berlin");
}
