use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single hourly sensor reading after melting a wide export row.
///
/// `value` is `None` where the export carried a sentinel missing code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

/// A daily time series with explicit nulls.
///
/// Dates are strictly increasing; `values[i]` belongs to `dates[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        Self { dates, values }
    }

    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Count of non-null values.
    pub fn coverage(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Drop nulls, keeping the surviving (date, value) pairs in order.
    pub fn drop_nulls(&self) -> (Vec<NaiveDate>, Vec<f64>) {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (date, value) in self.iter() {
            if let Some(v) = value {
                dates.push(date);
                values.push(v);
            }
        }
        (dates, values)
    }

    /// Distinct calendar years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.dates.iter().map(|d| d.year()).collect();
        years.dedup();
        years
    }

    /// Restrict to one calendar year.
    pub fn year_slice(&self, year: i32) -> DailySeries {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (date, value) in self.iter() {
            if date.year() == year {
                dates.push(date);
                values.push(value);
            }
        }
        DailySeries::new(dates, values)
    }
}

/// Several daily series sharing one date index, one named column each.
///
/// This is the durable-table shape: the `Datetime` row key plus a column
/// per pollutant (or per z-score, or the single index column).
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTable {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl DailyTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn push_column(&mut self, name: &str, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.push((name.to_string(), values));
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Extract one column as a standalone series on the table's index.
    pub fn series(&self, name: &str) -> Option<DailySeries> {
        self.column(name)
            .map(|values| DailySeries::new(self.dates.clone(), values.to_vec()))
    }

    /// Values of row `i` in column order.
    pub fn row(&self, i: usize) -> Vec<Option<f64>> {
        self.columns.iter().map(|(_, values)| values[i]).collect()
    }
}
