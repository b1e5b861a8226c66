use chrono::NaiveDate;

/// Result of the rank-correlation trend estimator.
///
/// `Undefined` covers both gates: too few samples, or the estimator
/// disabled by configuration. It is a value, not an error, so downstream
/// stages keep working with partial results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendEstimate {
    Undefined,
    Estimate { tau: f64, p_value: f64 },
}

impl TrendEstimate {
    pub fn is_defined(&self) -> bool {
        matches!(self, TrendEstimate::Estimate { .. })
    }
}

/// One row of the trend summary table: a tracked series with its OLS slope
/// and rank-correlation statistic. Undefined values serialize as empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummaryRow {
    pub series: String,
    pub slope_per_day: Option<f64>,
    pub rank_correlation: TrendEstimate,
}

/// Per-day extreme flags for one quantile, plus the fixed threshold that
/// produced them. Rows exist for every day of the index series; a null
/// index value never flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeTable {
    pub quantile: f64,
    pub threshold: f64,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
    pub flags: Vec<bool>,
}

impl ExtremeTable {
    pub fn flagged_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Count of extreme days per calendar year, ascending by year. Years
/// present in the series but without extremes appear with a zero count.
pub type YearlyCounts = Vec<(i32, usize)>;

/// Additive seasonal-trend decomposition of a daily series.
///
/// Indexed by the timestamps that survived null-dropping, not by the
/// original full date range. Invariant: for every `i`,
/// `trend[i] + seasonal[i] + resid[i] == value[i]` within floating
/// tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<f64>,
    /// The seasonal period actually used, after any shrinking fallback.
    pub period: usize,
}

impl Decomposition {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
