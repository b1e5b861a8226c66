//! Pipeline configuration.
//!
//! Every numeric parameter of the transform stages lives here so that no
//! stage carries implicit module-level constants. Defaults match the
//! documented analysis parameters.

use crate::error::{ProcessingError, Result};

/// Parameters for the ingestion and daily aggregation stage.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Minimum non-null hourly readings a day needs before its mean is kept.
    pub min_valid_hours: usize,
    /// How many leading raw rows to scan for the header.
    pub max_scan_rows: usize,
    /// Last-resort header row index when no detection rule matches.
    pub fallback_header_row: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            min_valid_hours: 18,
            max_scan_rows: 40,
            fallback_header_row: 11,
        }
    }
}

/// Parameters for the rolling z-score normalizer.
#[derive(Debug, Clone)]
pub struct NormalizationConfig {
    /// Trailing window length in days.
    pub window: usize,
    /// Minimum non-null samples required in the window.
    pub min_periods: usize,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            window: 90,
            min_periods: 30,
        }
    }
}

/// Parameters for the extreme detector.
#[derive(Debug, Clone)]
pub struct ExtremesConfig {
    /// Quantiles to evaluate, each in (0, 1).
    pub quantiles: Vec<f64>,
}

impl Default for ExtremesConfig {
    fn default() -> Self {
        Self {
            quantiles: vec![0.90, 0.95, 0.975],
        }
    }
}

impl ExtremesConfig {
    pub fn validate(&self) -> Result<()> {
        for &q in &self.quantiles {
            if !(q > 0.0 && q < 1.0) {
                return Err(ProcessingError::Config(format!(
                    "Quantile {} is outside (0, 1)",
                    q
                )));
            }
        }
        Ok(())
    }
}

/// Parameters for the trend estimators.
#[derive(Debug, Clone)]
pub struct TrendConfig {
    /// Minimum non-null samples for either estimator.
    pub min_samples: usize,
    /// Whether the rank-correlation estimator is available. When false the
    /// estimator reports `TrendEstimate::Undefined` instead of computing.
    pub rank_correlation: bool,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_samples: 10,
            rank_correlation: true,
        }
    }
}

/// Parameters for the seasonal-trend decomposer.
#[derive(Debug, Clone)]
pub struct DecompositionConfig {
    /// Seasonal period for the full-history decomposition.
    pub full_period: usize,
    /// Seasonal period for the per-year decompositions.
    pub yearly_period: usize,
    /// Years with fewer surviving days than this are skipped.
    pub min_yearly_coverage: usize,
    /// Floor for the period-shrinking fallback on short series.
    pub min_shrunk_period: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            full_period: 365,
            yearly_period: 30,
            min_yearly_coverage: 60,
            min_shrunk_period: 7,
        }
    }
}

/// Top-level configuration shared across stages.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub aggregation: AggregationConfig,
    pub normalization: NormalizationConfig,
    pub extremes: ExtremesConfig,
    pub trends: TrendConfig,
    pub decomposition: DecompositionConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.aggregation.min_valid_hours > 24 {
            return Err(ProcessingError::Config(format!(
                "min_valid_hours {} exceeds the 24 hourly slots of a day",
                self.aggregation.min_valid_hours
            )));
        }
        if self.normalization.min_periods > self.normalization.window {
            return Err(ProcessingError::Config(format!(
                "min_periods {} exceeds window {}",
                self.normalization.min_periods, self.normalization.window
            )));
        }
        self.extremes.validate()
    }
}
