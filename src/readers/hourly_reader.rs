use crate::config::AggregationConfig;
use crate::error::{ProcessingError, Result};
use crate::models::HourlyReading;
use crate::utils::constants::MISSING_SENTINELS;
use chrono::{Duration, NaiveDate, NaiveTime};
use csv::StringRecord;
use std::collections::HashSet;
use std::path::Path;

/// Which detection rule located the header row, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// A row containing a date-like label and an "H01" hour label.
    DateWithHours,
    /// A row containing a "Station ID" marker; the header is the next row.
    StationIdMarker,
    /// Last resort: the fixed row index from configuration.
    FixedRow,
}

impl HeaderRule {
    pub fn name(&self) -> &'static str {
        match self {
            HeaderRule::DateWithHours => "date-with-hours",
            HeaderRule::StationIdMarker => "station-id-marker",
            HeaderRule::FixedRow => "fixed-row",
        }
    }
}

/// Reads one raw Air Quality Ontario hourly export into a long-format
/// hourly series.
///
/// The exports carry a variable amount of preamble before the real header,
/// sentinel codes for missing readings, and one column per hour of day
/// (H01..H24). The reader locates the header, normalizes sentinels to
/// null, removes exact duplicate rows, drops rows with no readings at all,
/// and melts the remaining wide rows into hourly readings.
pub struct HourlyReader {
    max_scan_rows: usize,
    fallback_header_row: usize,
}

impl HourlyReader {
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            max_scan_rows: config.max_scan_rows,
            fallback_header_row: config.fallback_header_row,
        }
    }

    /// Read and melt a raw export file, sorted by timestamp.
    pub fn read_hourly(&self, path: &Path) -> Result<Vec<HourlyReading>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows: Vec<StringRecord> = Vec::new();
        for record in reader.records() {
            rows.push(record?);
        }

        let file = path.display().to_string();
        self.parse_rows(&rows, &file)
    }

    /// Parse already-loaded raw rows (exposed for tests).
    pub fn parse_rows(&self, rows: &[StringRecord], file: &str) -> Result<Vec<HourlyReading>> {
        let (header_row, rule) = self.detect_header_row(rows);
        if header_row >= rows.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Header row {} ({}) is beyond the end of '{}' ({} rows)",
                header_row,
                rule.name(),
                file,
                rows.len()
            )));
        }

        let columns: Vec<String> = rows[header_row]
            .iter()
            .map(|cell| cell.trim().to_string())
            .collect();

        let date_col = self.find_date_column(&columns).ok_or_else(|| {
            ProcessingError::MissingDateColumn {
                file: file.to_string(),
                header_row,
                rule: rule.name().to_string(),
                columns: columns.clone(),
            }
        })?;

        let hour_cols = self.find_hour_columns(&columns);
        if hour_cols.is_empty() {
            return Err(ProcessingError::MissingHourColumns {
                file: file.to_string(),
                header_row,
                columns,
            });
        }

        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut readings = Vec::new();

        for row in &rows[header_row + 1..] {
            let cells: Vec<String> = row.iter().map(|cell| cell.trim().to_string()).collect();

            // Exact duplicate rows are dropped.
            if !seen.insert(cells.clone()) {
                continue;
            }

            // Coerce semantics: rows with an unparseable date are dropped.
            let date = match cells.get(date_col).and_then(|cell| parse_date(cell)) {
                Some(date) => date,
                None => continue,
            };

            let values: Vec<Option<f64>> = hour_cols
                .iter()
                .map(|&(col, _)| cells.get(col).and_then(|cell| parse_value(cell)))
                .collect();

            // Rows where every hour is missing carry no information.
            if values.iter().all(|v| v.is_none()) {
                continue;
            }

            for (&(_, hour), &value) in hour_cols.iter().zip(values.iter()) {
                readings.push(HourlyReading {
                    timestamp: date.and_time(NaiveTime::MIN) + Duration::hours(hour as i64),
                    value,
                });
            }
        }

        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }

    /// Locate the header row. Rules are tried in a fixed priority order and
    /// each returns a definite match or no match.
    pub fn detect_header_row(&self, rows: &[StringRecord]) -> (usize, HeaderRule) {
        let scan = rows.len().min(self.max_scan_rows);

        for (i, row) in rows.iter().take(scan).enumerate() {
            let cells: Vec<String> = row.iter().map(|c| c.trim().to_lowercase()).collect();
            let has_date = cells.iter().any(|c| c.starts_with("date"));
            let has_hours = cells.iter().any(|c| c.starts_with("h01"));
            if has_date && has_hours {
                return (i, HeaderRule::DateWithHours);
            }
        }

        for (i, row) in rows.iter().take(scan).enumerate() {
            if row.iter().any(|c| c.trim().to_lowercase() == "station id") {
                return (i + 1, HeaderRule::StationIdMarker);
            }
        }

        (self.fallback_header_row, HeaderRule::FixedRow)
    }

    /// Case-insensitive, prefix-tolerant date column match ("Date", "DATE",
    /// "Date (LST)").
    fn find_date_column(&self, columns: &[String]) -> Option<usize> {
        columns.iter().position(|c| {
            let lc = c.trim().to_lowercase();
            lc == "date" || lc.starts_with("date")
        })
    }

    /// Hour columns are "H" plus an index 1..=24; "H01" is hour-of-day 0.
    fn find_hour_columns(&self, columns: &[String]) -> Vec<(usize, u32)> {
        columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                let label = c.trim().to_uppercase();
                let suffix = label.strip_prefix('H')?;
                let index: u32 = suffix.parse().ok()?;
                if (1..=24).contains(&index) {
                    Some((i, index - 1))
                } else {
                    None
                }
            })
            .collect()
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return Some(date);
        }
    }
    None
}

/// Parse one hourly cell; empty, non-numeric, and sentinel codes are null.
fn parse_value(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    let value: f64 = cell.parse().ok()?;
    if MISSING_SENTINELS.contains(&value) {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn reader() -> HourlyReader {
        HourlyReader::new(&AggregationConfig::default())
    }

    fn records(rows: &[&str]) -> Vec<StringRecord> {
        rows.iter()
            .map(|r| StringRecord::from(r.split(',').collect::<Vec<_>>()))
            .collect()
    }

    fn hour_header() -> String {
        let hours: Vec<String> = (1..=24).map(|h| format!("H{:02}", h)).collect();
        format!("Date,{}", hours.join(","))
    }

    fn data_row(date: &str, values: &[&str]) -> String {
        format!("{},{}", date, values.join(","))
    }

    #[test]
    fn test_detects_header_after_preamble() {
        let header = hour_header();
        let rows = records(&[
            "Air Quality Ontario export",
            "Pollutant: SO2",
            &header,
            &data_row("2021-01-01", &["1.0"; 24]),
        ]);

        let (row, rule) = reader().detect_header_row(&rows);
        assert_eq!(row, 2);
        assert_eq!(rule, HeaderRule::DateWithHours);
    }

    #[test]
    fn test_station_id_marker_points_at_next_row() {
        let rows = records(&["some preamble", "Station ID,12345", "Date,Other"]);
        let (row, rule) = reader().detect_header_row(&rows);
        assert_eq!(row, 2);
        assert_eq!(rule, HeaderRule::StationIdMarker);
    }

    #[test]
    fn test_fixed_row_fallback() {
        let rows = records(&["a", "b", "c"]);
        let (row, rule) = reader().detect_header_row(&rows);
        assert_eq!(row, 11);
        assert_eq!(rule, HeaderRule::FixedRow);
    }

    #[test]
    fn test_missing_date_column_is_descriptive() {
        let hours: Vec<String> = (1..=24).map(|h| format!("H{:02}", h)).collect();
        let header = format!("Station,{},Datx", hours.join(","));
        // No cell starts with "date", so the station-id marker picks the
        // next row as header and the date lookup fails there.
        let rows = records(&["Station ID,123", &header]);
        let err = reader().parse_rows(&rows, "test.csv").unwrap_err();
        match err {
            ProcessingError::MissingDateColumn { header_row, .. } => assert_eq!(header_row, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_hour_columns_is_descriptive() {
        let rows = records(&["Station ID,123", "Date,Value", "2021-01-01,1.0"]);
        let err = reader().parse_rows(&rows, "test.csv").unwrap_err();
        assert!(matches!(err, ProcessingError::MissingHourColumns { .. }));
    }

    #[test]
    fn test_melt_maps_h01_to_midnight() {
        let header = hour_header();
        let mut values = vec!["", "", "", "", "", "", "", "", "", "", "", ""].repeat(2);
        values[0] = "5.5";
        values[23] = "7.5";
        let row = data_row("2021-03-02", &values);
        let rows = records(&[&header, &row]);

        let readings = reader().parse_rows(&rows, "test.csv").unwrap();
        assert_eq!(readings.len(), 24);
        assert_eq!(
            readings[0].timestamp,
            NaiveDate::from_ymd_opt(2021, 3, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(readings[0].value, Some(5.5));
        assert_eq!(
            readings[23].timestamp,
            NaiveDate::from_ymd_opt(2021, 3, 2)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap()
        );
        assert_eq!(readings[23].value, Some(7.5));
        assert!(readings[1..23].iter().all(|r| r.value.is_none()));
    }

    #[test]
    fn test_sentinels_become_null_and_duplicates_drop() {
        let header = hour_header();
        let mut values = vec!["2.0"; 24];
        values[0] = "9999";
        values[1] = "-999";
        values[2] = "-9999";
        let row = data_row("2021-01-01", &values);
        // Same row twice: the duplicate must be removed before aggregation.
        let rows = records(&[&header, &row, &row]);

        let readings = reader().parse_rows(&rows, "test.csv").unwrap();
        assert_eq!(readings.len(), 24);
        assert_eq!(readings[0].value, None);
        assert_eq!(readings[1].value, None);
        assert_eq!(readings[2].value, None);
        assert_eq!(readings[3].value, Some(2.0));
    }

    #[test]
    fn test_all_null_rows_and_bad_dates_drop() {
        let header = hour_header();
        let all_missing = data_row("2021-01-02", &["9999"; 24]);
        let bad_date = data_row("not-a-date", &["1.0"; 24]);
        let good = data_row("2021-01-03", &["1.0"; 24]);
        let rows = records(&[&header, &all_missing, &bad_date, &good]);

        let readings = reader().parse_rows(&rows, "test.csv").unwrap();
        assert_eq!(readings.len(), 24);
        assert!(readings
            .iter()
            .all(|r| r.timestamp.date() == NaiveDate::from_ymd_opt(2021, 1, 3).unwrap()));
    }

    #[test]
    fn test_read_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Air Quality Ontario")?;
        writeln!(file, "Station ID,31103")?;
        writeln!(file, "{}", hour_header())?;
        writeln!(file, "{}", data_row("2021-01-01", &["3.0"; 24]))?;

        let readings = reader().read_hourly(file.path())?;
        assert_eq!(readings.len(), 24);
        assert!(readings.iter().all(|r| r.value == Some(3.0)));
        Ok(())
    }
}
