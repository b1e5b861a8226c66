use crate::config::NormalizationConfig;
use crate::models::DailyTable;
use crate::utils::constants::{POLLUTANTS, ZSCORE_SUFFIX};

/// Causal rolling z-score: each value standardized against the mean and
/// population standard deviation of the trailing window ending at it. No
/// look-ahead.
///
/// The result is null where the input is null, where fewer than
/// `min_periods` non-null samples are in the window, or where the trailing
/// standard deviation is exactly zero.
pub fn rolling_zscore(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let samples: Vec<f64> = values[start..=i].iter().flatten().copied().collect();

        let z = match values[i] {
            Some(x) if samples.len() >= min_periods => {
                let n = samples.len() as f64;
                let mean = samples.iter().sum::<f64>() / n;
                let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let sd = variance.sqrt();
                if sd == 0.0 {
                    None
                } else {
                    Some((x - mean) / sd)
                }
            }
            _ => None,
        };
        out.push(z);
    }

    out
}

/// Applies the rolling z-score to each tracked pollutant column of the
/// merged daily table, producing one `_z` column per pollutant present.
pub struct RollingNormalizer {
    window: usize,
    min_periods: usize,
}

impl RollingNormalizer {
    pub fn new(config: &NormalizationConfig) -> Self {
        Self {
            window: config.window,
            min_periods: config.min_periods,
        }
    }

    pub fn normalize(&self, merged: &DailyTable) -> DailyTable {
        let mut zscores = DailyTable::new(merged.dates().to_vec());
        // Tracked pollutants only, in fixed order; extra columns that
        // slipped into the merged table are ignored.
        for pollutant in POLLUTANTS {
            if let Some(values) = merged.column(pollutant) {
                let z = rolling_zscore(values, self.window, self.min_periods);
                zscores.push_column(&format!("{}{}", pollutant, ZSCORE_SUFFIX), z);
            }
        }
        zscores
    }
}
