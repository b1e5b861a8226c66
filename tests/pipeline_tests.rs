use chrono::{Datelike, Duration, NaiveDate};
use dpbi_processor::config::PipelineConfig;
use dpbi_processor::models::DailySeries;
use dpbi_processor::processors::{
    DailyAggregator, DailyMerger, ExtremeDetector, IndexBuilder, RollingNormalizer,
    SeasonalDecomposer, TrendEstimator,
};
use dpbi_processor::readers::{HourlyReader, TableReader};
use dpbi_processor::writers::CsvWriter;
use pretty_assertions::assert_eq;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const DAYS: usize = 150;

/// Deterministic daily signal: a seasonal swing on a slow upward drift.
fn signal(day: usize, offset: f64) -> f64 {
    (2.0 * std::f64::consts::PI * day as f64 / 30.0).sin() * 2.0 + day as f64 * 0.01 + offset
}

/// Write a synthetic raw hourly export in the Air Quality Ontario shape:
/// preamble rows, a detectable header, one column per hour, sentinels for
/// a few readings, one exact duplicate row, and one day with too few
/// valid hours to keep its mean.
fn write_raw_export(path: &Path, offset: f64) {
    let mut file = File::create(path).unwrap();
    writeln!(file, "Air Quality Ontario hourly export").unwrap();
    writeln!(file, "Station ID,31103").unwrap();
    writeln!(file, "Pollutant concentration (ppb)").unwrap();

    let hours: Vec<String> = (1..=24).map(|h| format!("H{:02}", h)).collect();
    writeln!(file, "Date,{}", hours.join(",")).unwrap();

    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    for day in 0..DAYS {
        let date = start + Duration::days(day as i64);
        let value = signal(day, offset);
        let cells: Vec<String> = (0..24)
            .map(|hour| {
                if day == 40 && hour < 10 {
                    // Day 40 keeps only 10 valid hours, below the threshold.
                    "9999".to_string()
                } else if day == 40 && hour >= 20 {
                    "-999".to_string()
                } else {
                    format!("{}", value)
                }
            })
            .collect();
        writeln!(file, "{},{}", date, cells.join(",")).unwrap();
        if day == 3 {
            // Exact duplicate row; must not double-count readings.
            writeln!(file, "{},{}", date, cells.join(",")).unwrap();
        }
    }
}

fn ingest(dir: &Path, config: &PipelineConfig) -> Vec<(String, DailySeries)> {
    let reader = HourlyReader::new(&config.aggregation);
    let aggregator = DailyAggregator::new(&config.aggregation);

    [("SO2", 0.0), ("NO2", 5.0)]
        .iter()
        .map(|(pollutant, offset)| {
            let path = dir.join(format!("{}.csv", pollutant));
            write_raw_export(&path, *offset);
            let readings = reader.read_hourly(&path).unwrap();
            (
                pollutant.to_string(),
                aggregator.aggregate(&readings),
            )
        })
        .collect()
}

#[test]
fn test_ingest_to_merged_daily_table() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default();

    let daily = ingest(dir.path(), &config);
    let merged = DailyMerger::new().merge(&daily);

    assert_eq!(merged.len(), DAYS);
    assert_eq!(merged.column_names(), vec!["SO2", "NO2"]);

    let so2 = merged.column("SO2").unwrap();
    // Day 40 had only 10 valid hours against min_valid_hours=18.
    assert_eq!(so2[40], None);
    // The duplicate row on day 3 must not skew the mean.
    assert!((so2[3].unwrap() - signal(3, 0.0)).abs() < 1e-9);
    assert!((so2[0].unwrap() - signal(0, 0.0)).abs() < 1e-9);

    // Durable round trip.
    let path = dir.path().join("merged_daily_mean.csv");
    CsvWriter::new().write_daily_table(&path, &merged).unwrap();
    let read_back = TableReader::new().read_daily_table(&path).unwrap();
    assert_eq!(read_back.len(), merged.len());
    assert_eq!(read_back.column("NO2").unwrap()[40], None);
}

#[test]
fn test_features_extremes_and_trends_downstream() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default();

    let daily = ingest(dir.path(), &config);
    let merged = DailyMerger::new().merge(&daily);

    let zscores = RollingNormalizer::new(&config.normalization).normalize(&merged);
    assert_eq!(zscores.column_names(), vec!["SO2_z", "NO2_z"]);

    let index = IndexBuilder::new().build(&zscores);
    assert_eq!(index.len(), DAYS);
    // Warm-up: no z-score before min_periods samples accumulate.
    assert_eq!(index.values()[10], None);
    assert!(index.values()[100].is_some());

    // Durable round trip of the index.
    let path = dir.path().join("dpbi.csv");
    CsvWriter::new()
        .write_daily_series(&path, "DPBI", &index)
        .unwrap();
    let index = TableReader::new().read_daily_series(&path, "DPBI").unwrap();

    // Extremes at the 95th percentile: roughly 5% of covered days flag,
    // and the yearly counts add up to the flagged total.
    let detector = ExtremeDetector::new();
    let table = detector.detect(&index, 0.95).unwrap();
    let flagged = table.flagged_count();
    let covered = index.coverage();
    assert!(flagged > 0);
    assert!(flagged <= covered / 10);

    let counts = detector.yearly_counts(&table);
    assert_eq!(counts.iter().map(|(_, c)| c).sum::<usize>(), flagged);
    assert_eq!(counts[0].0, 2021);

    // Trend summary covers both pollutants and the index; the drifting
    // signal gives defined estimates everywhere.
    let rows = TrendEstimator::new(&config.trends).summarize(&merged, "DPBI", &index);
    let names: Vec<&str> = rows.iter().map(|r| r.series.as_str()).collect();
    assert_eq!(names, vec!["SO2", "NO2", "DPBI"]);
    let so2_slope = rows[0].slope_per_day.unwrap();
    assert!((so2_slope - 0.01).abs() < 0.005, "slope {}", so2_slope);
}

#[test]
fn test_decomposition_of_computed_index() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default();

    let daily = ingest(dir.path(), &config);
    let merged = DailyMerger::new().merge(&daily);
    let zscores = RollingNormalizer::new(&config.normalization).normalize(&merged);
    let index = IndexBuilder::new().build(&zscores);

    let decomposer = SeasonalDecomposer::new(&config.decomposition);
    let result = decomposer
        .decompose("DPBI", &index, config.decomposition.full_period)
        .unwrap();

    // 150 days minus the warm-up leaves well under two full years, so the
    // requested period of 365 must shrink.
    let covered = index.coverage();
    assert_eq!(result.len(), covered);
    assert!(result.period <= covered / 2);
    assert!(result.period >= 7);

    for i in 0..result.len() {
        let reconstructed = result.trend[i] + result.seasonal[i] + result.resid[i];
        assert!((reconstructed - result.values[i]).abs() < 1e-6);
    }

    // Only 2021 is present and it has enough coverage.
    let yearly = decomposer.decompose_by_year("DPBI", &index).unwrap();
    assert_eq!(yearly.len(), 1);
    assert_eq!(yearly[0].0, 2021);
    assert_eq!(yearly[0].1.period, config.decomposition.yearly_period);
    assert!(yearly[0]
        .1
        .dates
        .iter()
        .all(|d| d.year() == 2021));
}
