use crate::error::{ProcessingError, Result};
use crate::models::{DailySeries, DailyTable};
use chrono::NaiveDate;
use std::path::Path;

/// Reads the durable daily CSV artifacts back for downstream stages.
///
/// Every artifact shares the same shape: a `Datetime` row key holding an
/// ISO-8601 date, then one numeric column per series, with empty fields
/// for nulls.
pub struct TableReader;

impl TableReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a whole daily table.
    pub fn read_daily_table(&self, path: &Path) -> Result<DailyTable> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        if headers.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "'{}' has no header row",
                path.display()
            )));
        }

        let mut dates: Vec<NaiveDate> = Vec::new();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len() - 1];

        for record in reader.records() {
            let record = record?;
            let date_cell = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_cell.trim(), "%Y-%m-%d")?;
            dates.push(date);

            for (i, column) in columns.iter_mut().enumerate() {
                let cell = record.get(i + 1).unwrap_or_default().trim();
                if cell.is_empty() {
                    column.push(None);
                } else {
                    let value: f64 = cell.parse().map_err(|_| {
                        ProcessingError::InvalidFormat(format!(
                            "Non-numeric value '{}' in '{}' column '{}'",
                            cell,
                            path.display(),
                            &headers[i + 1]
                        ))
                    })?;
                    column.push(Some(value));
                }
            }
        }

        let mut table = DailyTable::new(dates);
        for (i, values) in columns.into_iter().enumerate() {
            table.push_column(&headers[i + 1], values);
        }
        Ok(table)
    }

    /// Read one named column as a standalone series.
    pub fn read_daily_series(&self, path: &Path, column: &str) -> Result<DailySeries> {
        let table = self.read_daily_table(path)?;
        table
            .series(column)
            .ok_or_else(|| ProcessingError::MissingColumn {
                file: path.display().to_string(),
                column: column.to_string(),
                columns: table
                    .column_names()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            })
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}
