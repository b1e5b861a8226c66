use crate::utils::constants::{
    DEFAULT_NO2_FILE, DEFAULT_O3_FILE, DEFAULT_PM25_FILE, DEFAULT_SO2_FILE,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dpbi-processor")]
#[command(about = "Daily Pollution Burden Index processor for hourly air-quality exports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest raw hourly exports into per-pollutant and merged daily mean tables
    Ingest {
        #[arg(short, long, help = "Directory containing the raw hourly exports")]
        input_dir: PathBuf,

        #[arg(short, long, default_value = "data_processed")]
        output_dir: PathBuf,

        #[arg(long, default_value = DEFAULT_SO2_FILE, help = "SO2 export file name")]
        so2_file: String,

        #[arg(long, default_value = DEFAULT_NO2_FILE, help = "NO2 export file name")]
        no2_file: String,

        #[arg(long, default_value = DEFAULT_O3_FILE, help = "O3 export file name")]
        o3_file: String,

        #[arg(long, default_value = DEFAULT_PM25_FILE, help = "PM2.5 export file name")]
        pm25_file: String,

        #[arg(
            long,
            default_value_t = 18,
            help = "Minimum non-null hourly readings before a day keeps its mean"
        )]
        min_valid_hours: usize,
    },

    /// Compute rolling z-scores and the composite index (DPBI)
    Features {
        #[arg(short, long, default_value = "data_processed")]
        data_dir: PathBuf,

        #[arg(long, default_value_t = 90, help = "Trailing window length in days")]
        window: usize,

        #[arg(
            long,
            default_value_t = 30,
            help = "Minimum non-null samples required in the window"
        )]
        min_periods: usize,
    },

    /// Flag quantile extremes of the index and count them per year
    Extremes {
        #[arg(short, long, default_value = "data_processed")]
        data_dir: PathBuf,

        #[arg(
            long,
            value_delimiter = ',',
            default_values_t = vec![0.90, 0.95, 0.975],
            help = "Quantiles to evaluate, each in (0, 1)"
        )]
        quantiles: Vec<f64>,
    },

    /// Estimate OLS slope and rank-correlation trends per tracked series
    Trends {
        #[arg(short, long, default_value = "data_processed")]
        data_dir: PathBuf,

        #[arg(
            long,
            default_value_t = 10,
            help = "Minimum non-null samples for either estimator"
        )]
        min_samples: usize,

        #[arg(long, help = "Disable the rank-correlation estimator")]
        no_rank_correlation: bool,
    },

    /// Decompose the index into trend, seasonal and residual components
    Decompose {
        #[arg(short, long, default_value = "data_processed")]
        data_dir: PathBuf,

        #[arg(
            long,
            default_value_t = 365,
            help = "Seasonal period for the full-history decomposition"
        )]
        period: usize,

        #[arg(
            long,
            default_value_t = 30,
            help = "Seasonal period for the per-year decompositions"
        )]
        yearly_period: usize,

        #[arg(
            long,
            default_value_t = 60,
            help = "Skip years with fewer surviving days than this"
        )]
        min_yearly_coverage: usize,
    },

    /// Run every stage in pipeline order
    Run {
        #[arg(short, long, help = "Directory containing the raw hourly exports")]
        input_dir: PathBuf,

        #[arg(short, long, default_value = "data_processed")]
        output_dir: PathBuf,

        #[arg(long, default_value_t = 18)]
        min_valid_hours: usize,

        #[arg(long, default_value_t = 90)]
        window: usize,

        #[arg(long, default_value_t = 30)]
        min_periods: usize,

        #[arg(long, value_delimiter = ',', default_values_t = vec![0.90, 0.95, 0.975])]
        quantiles: Vec<f64>,

        #[arg(long, default_value_t = 365)]
        period: usize,
    },

    /// Summarize a daily index table
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "DPBI")]
        column: String,
    },
}
