use crate::config::TrendConfig;
use crate::models::{DailySeries, DailyTable, TrendEstimate, TrendSummaryRow};
use crate::utils::constants::POLLUTANTS;
use statrs::distribution::{ContinuousCDF, Normal};

/// Per-series trend estimators, each gated by a minimum sample size and
/// failing soft: too few samples yields an undefined result, never an
/// error.
pub struct TrendEstimator {
    min_samples: usize,
    rank_correlation: bool,
}

impl TrendEstimator {
    pub fn new(config: &TrendConfig) -> Self {
        Self {
            min_samples: config.min_samples,
            rank_correlation: config.rank_correlation,
        }
    }

    /// Ordinary-least-squares slope in units per day, regressing values
    /// against whole days elapsed since the first surviving observation.
    pub fn ols_slope(&self, series: &DailySeries) -> Option<f64> {
        let (dates, values) = series.drop_nulls();
        if values.len() < self.min_samples {
            return None;
        }

        let x: Vec<f64> = dates
            .iter()
            .map(|d| (*d - dates[0]).num_days() as f64)
            .collect();
        let n = x.len() as f64;
        let x_mean = x.iter().sum::<f64>() / n;
        let y_mean = values.iter().sum::<f64>() / n;

        let sxx: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = x
            .iter()
            .zip(values.iter())
            .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
            .sum();

        Some(sxy / sxx)
    }

    /// Kendall's tau-b between chronological order and value, with a
    /// two-sided significance from the tie-corrected normal approximation.
    pub fn rank_correlation(&self, series: &DailySeries) -> TrendEstimate {
        if !self.rank_correlation {
            return TrendEstimate::Undefined;
        }
        let (_, values) = series.drop_nulls();
        let n = values.len();
        if n < self.min_samples {
            return TrendEstimate::Undefined;
        }

        // The regressor is sequence order, so only the values can tie.
        let mut concordant = 0i64;
        let mut discordant = 0i64;
        for i in 0..n {
            for j in (i + 1)..n {
                let diff = values[j] - values[i];
                if diff > 0.0 {
                    concordant += 1;
                } else if diff < 0.0 {
                    discordant += 1;
                }
            }
        }

        let tie_sizes = value_tie_sizes(&values);
        let n0 = (n * (n - 1) / 2) as f64;
        let n2: f64 = tie_sizes.iter().map(|&t| (t * (t - 1) / 2) as f64).sum();

        let denom = (n0 * (n0 - n2)).sqrt();
        if denom == 0.0 {
            return TrendEstimate::Undefined;
        }
        let s = (concordant - discordant) as f64;
        let tau = s / denom;

        // Variance of S under the null, corrected for ties in the values.
        let nf = n as f64;
        let v0 = nf * (nf - 1.0) * (2.0 * nf + 5.0);
        let vt: f64 = tie_sizes
            .iter()
            .map(|&t| {
                let tf = t as f64;
                tf * (tf - 1.0) * (2.0 * tf + 5.0)
            })
            .sum();
        let variance = (v0 - vt) / 18.0;
        if variance <= 0.0 {
            return TrendEstimate::Undefined;
        }

        // Degrade to undefined if the reference distribution cannot be
        // built, matching the soft policy for the whole estimator.
        let normal = match Normal::new(0.0, 1.0) {
            Ok(normal) => normal,
            Err(_) => return TrendEstimate::Undefined,
        };
        let z = s / variance.sqrt();
        let p_value = 2.0 * (1.0 - normal.cdf(z.abs()));

        TrendEstimate::Estimate { tau, p_value }
    }

    /// One summary row per tracked pollutant present in the merged table,
    /// plus the composite index.
    pub fn summarize(
        &self,
        merged: &DailyTable,
        index_name: &str,
        index: &DailySeries,
    ) -> Vec<TrendSummaryRow> {
        let mut rows = Vec::new();
        for pollutant in POLLUTANTS {
            if let Some(series) = merged.series(pollutant) {
                rows.push(self.summarize_one(pollutant, &series));
            }
        }
        rows.push(self.summarize_one(index_name, index));
        rows
    }

    fn summarize_one(&self, name: &str, series: &DailySeries) -> TrendSummaryRow {
        TrendSummaryRow {
            series: name.to_string(),
            slope_per_day: self.ols_slope(series),
            rank_correlation: self.rank_correlation(series),
        }
    }
}

/// Sizes of tie groups among the values (groups of size 1 are irrelevant
/// to both corrections but harmless).
fn value_tie_sizes(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut sizes = Vec::new();
    let mut run = 1;
    for i in 1..sorted.len() {
        if sorted[i] == sorted[i - 1] {
            run += 1;
        } else {
            sizes.push(run);
            run = 1;
        }
    }
    sizes.push(run);
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn daily(values: Vec<Option<f64>>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        DailySeries::new(dates, values)
    }

    fn estimator() -> TrendEstimator {
        TrendEstimator::new(&TrendConfig::default())
    }

    #[test]
    fn test_ols_recovers_synthetic_slope() {
        let series = daily((0..40).map(|t| Some(1.5 * t as f64 + 3.0)).collect());
        let slope = estimator().ols_slope(&series).unwrap();
        assert!((slope - 1.5).abs() < 1e-6, "slope {}", slope);
    }

    #[test]
    fn test_ols_uses_days_elapsed_across_gaps() {
        // Same line, but with nulls punched out: the day count, not the
        // sample count, is the regressor.
        let series = daily(
            (0..40)
                .map(|t| {
                    if t % 5 == 3 {
                        None
                    } else {
                        Some(1.5 * t as f64 + 3.0)
                    }
                })
                .collect(),
        );
        let slope = estimator().ols_slope(&series).unwrap();
        assert!((slope - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_ols_undefined_below_min_samples() {
        let series = daily((0..9).map(|t| Some(t as f64)).collect());
        assert_eq!(estimator().ols_slope(&series), None);
    }

    #[test]
    fn test_rank_correlation_gates_short_series() {
        let series = daily((0..4).map(|t| Some(t as f64)).collect());
        assert_eq!(
            estimator().rank_correlation(&series),
            TrendEstimate::Undefined
        );
    }

    #[test]
    fn test_rank_correlation_on_monotonic_series() {
        let series = daily((0..30).map(|t| Some(t as f64)).collect());
        match estimator().rank_correlation(&series) {
            TrendEstimate::Estimate { tau, p_value } => {
                assert!(tau > 0.95, "tau {}", tau);
                assert!(p_value < 1e-4, "p {}", p_value);
            }
            TrendEstimate::Undefined => panic!("expected a defined estimate"),
        }
    }

    #[test]
    fn test_rank_correlation_disabled_by_capability_flag() {
        let config = TrendConfig {
            min_samples: 10,
            rank_correlation: false,
        };
        let series = daily((0..30).map(|t| Some(t as f64)).collect());
        assert_eq!(
            TrendEstimator::new(&config).rank_correlation(&series),
            TrendEstimate::Undefined
        );
    }

    #[test]
    fn test_constant_series_is_undefined() {
        // All values tie: tau has a zero denominator.
        let series = daily(vec![Some(2.0); 20]);
        assert_eq!(
            estimator().rank_correlation(&series),
            TrendEstimate::Undefined
        );
    }

    #[test]
    fn test_summary_covers_pollutants_and_index() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..20).map(|i| start + Duration::days(i)).collect();
        let values: Vec<Option<f64>> = (0..20).map(|t| Some(t as f64)).collect();

        let mut merged = DailyTable::new(dates.clone());
        merged.push_column("SO2", values.clone());
        merged.push_column("O3", values.clone());

        let index = DailySeries::new(dates, values);
        let rows = estimator().summarize(&merged, "DPBI", &index);

        let names: Vec<&str> = rows.iter().map(|r| r.series.as_str()).collect();
        assert_eq!(names, vec!["SO2", "O3", "DPBI"]);
        assert!(rows.iter().all(|r| r.slope_per_day.is_some()));
        assert!(rows.iter().all(|r| r.rank_correlation.is_defined()));
    }
}
