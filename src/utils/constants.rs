/// Tracked pollutant column names, in table column order.
pub const POLLUTANTS: [&str; 4] = ["SO2", "NO2", "O3", "PM25"];

/// Composite index column name.
pub const INDEX_NAME: &str = "DPBI";

/// Row-key column name shared by every durable table.
pub const DATETIME_COLUMN: &str = "Datetime";

/// Suffix appended to pollutant names in the z-score table.
pub const ZSCORE_SUFFIX: &str = "_z";

/// Sentinel codes the data source uses for "no reading".
pub const MISSING_SENTINELS: [f64; 3] = [9999.0, -999.0, -9999.0];

/// Default raw export file names per pollutant.
pub const DEFAULT_SO2_FILE: &str = "Sulphate_2021_2024.csv";
pub const DEFAULT_NO2_FILE: &str = "Nitrogen_2021_2024.csv";
pub const DEFAULT_O3_FILE: &str = "Ozone_2021-2024.csv";
pub const DEFAULT_PM25_FILE: &str = "PM2.5_2021_2024.csv";

/// Intermediate/output file names.
pub const MERGED_DAILY_FILE: &str = "merged_daily_mean.csv";
pub const ZSCORES_FILE: &str = "zscores_90d.csv";
pub const INDEX_FILE: &str = "dpbi.csv";
pub const TREND_SUMMARY_FILE: &str = "trend_summary.csv";
pub const STL_FULL_FILE: &str = "dpbi_stl_components_full.csv";
