pub mod daily_aggregator;
pub mod decomposer;
pub mod extremes;
pub mod index_builder;
pub mod merger;
pub mod normalizer;
pub mod trends;

pub use daily_aggregator::DailyAggregator;
pub use decomposer::SeasonalDecomposer;
pub use extremes::{quantile_linear, ExtremeDetector};
pub use index_builder::IndexBuilder;
pub use merger::DailyMerger;
pub use normalizer::{rolling_zscore, RollingNormalizer};
pub use trends::TrendEstimator;
