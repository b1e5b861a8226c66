use crate::config::DecompositionConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DailySeries, Decomposition};

/// Robust seasonal-trend decomposition of daily series.
///
/// Nulls are dropped before fitting, so the output is indexed by the
/// surviving timestamps only. Short series shrink the seasonal period
/// instead of failing; an entirely empty series is a pipeline ordering
/// mistake and aborts.
pub struct SeasonalDecomposer {
    config: DecompositionConfig,
}

impl SeasonalDecomposer {
    pub fn new(config: &DecompositionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn decompose(
        &self,
        name: &str,
        series: &DailySeries,
        requested_period: usize,
    ) -> Result<Decomposition> {
        let (dates, values) = series.drop_nulls();
        if values.is_empty() {
            return Err(ProcessingError::EmptySeries(name.to_string()));
        }

        let mut period = requested_period;
        if values.len() < 2 * period {
            // Too short for a stable seasonal pattern; try a smaller period.
            period = self
                .config
                .min_shrunk_period
                .max(period.min(values.len() / 2));
        }

        let (trend, seasonal) = Stl::new(period).robust().fit(&values).ok_or(
            ProcessingError::InsufficientData {
                series: name.to_string(),
                samples: values.len(),
                period,
            },
        )?;

        // Residual is computed last, so the additive identity
        // value = trend + seasonal + resid holds exactly.
        let resid = values
            .iter()
            .zip(trend.iter())
            .zip(seasonal.iter())
            .map(|((v, t), s)| v - t - s)
            .collect();

        Ok(Decomposition {
            dates,
            values,
            trend,
            seasonal,
            resid,
            period,
        })
    }

    /// Decompose each calendar year separately with the per-year period,
    /// skipping years whose surviving coverage is below the threshold.
    pub fn decompose_by_year(
        &self,
        name: &str,
        series: &DailySeries,
    ) -> Result<Vec<(i32, Decomposition)>> {
        let mut results = Vec::new();
        for year in series.years() {
            let yearly = series.year_slice(year);
            let coverage = yearly.coverage();
            if coverage < self.config.min_yearly_coverage {
                tracing::info!(
                    year,
                    coverage,
                    threshold = self.config.min_yearly_coverage,
                    "skipping yearly decomposition: not enough data"
                );
                continue;
            }
            let label = format!("{} {}", name, year);
            results.push((
                year,
                self.decompose(&label, &yearly, self.config.yearly_period)?,
            ));
        }
        Ok(results)
    }
}

/// Seasonal-trend decomposition via locally-weighted smoothing, after
/// Cleveland et al. (1990): cycle-subseries smoothing for the seasonal,
/// a triple moving-average low-pass filter, and tricube-weighted local
/// smoothing for the trend, with bisquare robustness reweighting between
/// outer passes.
struct Stl {
    period: usize,
    seasonal_span: usize,
    trend_span: usize,
    low_pass_span: usize,
    inner_iterations: usize,
    outer_iterations: usize,
}

impl Stl {
    fn new(period: usize) -> Self {
        let ns = period | 1;
        let nt = (1.5 * period as f64 / (1.0 - 1.5 / ns as f64)).ceil() as usize;
        Self {
            period,
            seasonal_span: ns,
            trend_span: nt | 1,
            low_pass_span: period | 1,
            inner_iterations: 2,
            outer_iterations: 1,
        }
    }

    fn robust(mut self) -> Self {
        self.outer_iterations = 6;
        self
    }

    /// Fit trend and seasonal components. `None` when the series is
    /// shorter than two full periods.
    fn fit(&self, series: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
        let n = series.len();
        if n < 2 * self.period {
            return None;
        }

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        for outer in 0..self.outer_iterations {
            for _ in 0..self.inner_iterations {
                let detrended: Vec<f64> =
                    series.iter().zip(trend.iter()).map(|(y, t)| y - t).collect();

                let subseries_smooth = self.smooth_cycle_subseries(&detrended, &weights);
                let low_pass = self.low_pass(&subseries_smooth);
                for i in 0..n {
                    seasonal[i] = subseries_smooth[i] - low_pass[i];
                }

                let deseasonalized: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .map(|(y, s)| y - s)
                    .collect();
                trend = local_smooth(&deseasonalized, self.trend_span, &weights);
            }

            if outer + 1 < self.outer_iterations {
                let remainder: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .zip(trend.iter())
                    .map(|((y, s), t)| y - s - t)
                    .collect();
                weights = bisquare_weights(&remainder);
            }
        }

        Some((trend, seasonal))
    }

    /// Smooth each cycle-subseries (every `period`-th point) separately,
    /// scattering the smoothed values back into place.
    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let n = detrended.len();
        let mut result = vec![0.0; n];

        for phase in 0..self.period {
            let indices: Vec<usize> = (phase..n).step_by(self.period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let sub_weights: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

            let smoothed = local_smooth(&values, self.seasonal_span, &sub_weights);
            for (&i, &s) in indices.iter().zip(smoothed.iter()) {
                result[i] = s;
            }
        }

        result
    }

    /// Triple moving average followed by a local smooth, removing any
    /// residual trend from the cycle-subseries estimate.
    fn low_pass(&self, series: &[f64]) -> Vec<f64> {
        let ma = moving_average(series, self.period);
        let ma = moving_average(&ma, self.period);
        let ma = moving_average(&ma, 3);
        let weights = vec![1.0; series.len()];
        local_smooth(&ma, self.low_pass_span, &weights)
    }
}

/// Tricube-weighted local smoothing over a centered window.
fn local_smooth(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = span / 2;
    let mut result = vec![0.0; n];

    for i in 0..n {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(n);

        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;
        for j in start..end {
            let u = (i as f64 - j as f64).abs() / (half as f64 + 1.0);
            let tricube = if u < 1.0 { (1.0 - u.powi(3)).powi(3) } else { 0.0 };
            let w = tricube * weights[j];
            weight_sum += w;
            value_sum += w * values[j];
        }

        result[i] = if weight_sum > 0.0 {
            value_sum / weight_sum
        } else {
            values[i]
        };
    }

    result
}

/// Centered moving average, shrinking the window at the edges.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;
    let mut result = vec![0.0; n];
    for i in 0..n {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(n);
        result[i] = values[start..end].iter().sum::<f64>() / (end - start) as f64;
    }
    result
}

/// Bisquare robustness weights from the remainder: points with large
/// residuals relative to six times the median absolute residual are
/// downweighted toward zero.
fn bisquare_weights(remainder: &[f64]) -> Vec<f64> {
    let mut abs_remainder: Vec<f64> = remainder.iter().map(|r| r.abs()).collect();
    abs_remainder.sort_by(|a, b| a.total_cmp(b));
    let n = abs_remainder.len();
    let median = if n % 2 == 0 {
        (abs_remainder[n / 2 - 1] + abs_remainder[n / 2]) / 2.0
    } else {
        abs_remainder[n / 2]
    };

    let h = 6.0 * median;
    remainder
        .iter()
        .map(|r| {
            if h < 1e-10 {
                return 1.0;
            }
            let u = r.abs() / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}
