pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{
    daily_mean_filename, extremes_filename, quantile_tag, stl_year_filename,
    yearly_counts_filename,
};
pub use progress::ProgressReporter;
