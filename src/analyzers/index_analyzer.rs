use crate::error::{ProcessingError, Result};
use crate::models::DailySeries;
use chrono::{Datelike, NaiveDate};

#[derive(Debug)]
pub struct IndexStatistics {
    pub series: String,
    pub date_range: (NaiveDate, NaiveDate),
    pub total_days: usize,
    pub covered_days: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub yearly_coverage: Vec<(i32, usize)>,
}

impl IndexStatistics {
    pub fn coverage_percentage(&self) -> f64 {
        (self.covered_days as f64 / self.total_days as f64) * 100.0
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Series: {}", self.series),
            format!(
                "Date Range: {} to {} ({} days)",
                self.date_range.0, self.date_range.1, self.total_days
            ),
            format!(
                "Coverage: {}/{} days ({:.1}%)",
                self.covered_days,
                self.total_days,
                self.coverage_percentage()
            ),
            format!(
                "Values: mean {:.3}, min {:.3}, max {:.3}",
                self.mean, self.min, self.max
            ),
            "Per-year coverage:".to_string(),
        ];
        for (year, days) in &self.yearly_coverage {
            lines.push(format!("  {}: {} days", year, days));
        }
        lines.join("\n")
    }
}

/// Summarizes a daily index series for the `info` command.
pub struct IndexAnalyzer;

impl IndexAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, name: &str, series: &DailySeries) -> Result<IndexStatistics> {
        let (dates, values) = series.drop_nulls();
        let (first, last) = match (series.dates().first(), series.dates().last()) {
            (Some(&first), Some(&last)) if !values.is_empty() => (first, last),
            _ => return Err(ProcessingError::EmptySeries(name.to_string())),
        };

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in &values {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
            sum += v;
        }

        let mut yearly_coverage: Vec<(i32, usize)> = Vec::new();
        for date in &dates {
            match yearly_coverage.last_mut() {
                Some((year, count)) if *year == date.year() => *count += 1,
                _ => yearly_coverage.push((date.year(), 1)),
            }
        }

        Ok(IndexStatistics {
            series: name.to_string(),
            date_range: (first, last),
            total_days: series.len(),
            covered_days: values.len(),
            mean: sum / values.len() as f64,
            min,
            max,
            yearly_coverage,
        })
    }
}

impl Default for IndexAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
