pub mod series;
pub mod summary;

pub use series::{DailySeries, DailyTable, HourlyReading};
pub use summary::{Decomposition, ExtremeTable, TrendEstimate, TrendSummaryRow, YearlyCounts};
