use crate::models::{DailySeries, ExtremeTable, YearlyCounts};
use chrono::Datelike;
use std::collections::BTreeMap;

/// Empirical quantile with linear interpolation between order statistics.
/// `sorted` must be ascending and non-empty.
pub fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = q * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Flags days where the index meets or exceeds the q-quantile of its full
/// non-null history.
pub struct ExtremeDetector;

impl ExtremeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when the series has no non-null history to take a
    /// quantile over — an insufficient-data condition, not an error.
    pub fn detect(&self, series: &DailySeries, q: f64) -> Option<ExtremeTable> {
        let (_, mut non_null) = series.drop_nulls();
        if non_null.is_empty() {
            return None;
        }
        non_null.sort_by(|a, b| a.total_cmp(b));
        let threshold = quantile_linear(&non_null, q);

        let flags = series
            .values()
            .iter()
            .map(|v| v.is_some_and(|x| x >= threshold))
            .collect();

        Some(ExtremeTable {
            quantile: q,
            threshold,
            dates: series.dates().to_vec(),
            values: series.values().to_vec(),
            flags,
        })
    }

    /// Count flagged days per calendar year. Every year present in the
    /// table appears, including years with zero extremes.
    pub fn yearly_counts(&self, table: &ExtremeTable) -> YearlyCounts {
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for (date, &flag) in table.dates.iter().zip(table.flags.iter()) {
            *counts.entry(date.year()).or_insert(0) += flag as usize;
        }
        counts.into_iter().collect()
    }
}

impl Default for ExtremeDetector {
    fn default() -> Self {
        Self::new()
    }
}
