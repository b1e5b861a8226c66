use crate::error::Result;
use crate::models::{
    DailySeries, DailyTable, Decomposition, ExtremeTable, TrendEstimate, TrendSummaryRow,
};
use crate::utils::constants::DATETIME_COLUMN;
use std::path::Path;

/// Writes the durable CSV artifacts.
///
/// Every daily table starts with a `Datetime` column holding an ISO-8601
/// date; nulls and undefined statistics serialize as empty fields so they
/// stay distinguishable from computed values.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_daily_series(&self, path: &Path, name: &str, series: &DailySeries) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([DATETIME_COLUMN, name])?;
        for (date, value) in series.iter() {
            writer.write_record([date.to_string(), fmt_opt(value)])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_daily_table(&self, path: &Path, table: &DailyTable) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec![DATETIME_COLUMN.to_string()];
        header.extend(table.column_names().iter().map(|c| c.to_string()));
        writer.write_record(&header)?;

        for (i, date) in table.dates().iter().enumerate() {
            let mut record = vec![date.to_string()];
            record.extend(table.row(i).into_iter().map(fmt_opt));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_extremes(&self, path: &Path, table: &ExtremeTable) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([DATETIME_COLUMN, "value", "is_high_extreme", "threshold"])?;
        for i in 0..table.dates.len() {
            writer.write_record([
                table.dates[i].to_string(),
                fmt_opt(table.values[i]),
                table.flags[i].to_string(),
                table.threshold.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_yearly_counts(&self, path: &Path, counts: &[(i32, usize)]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["year", "count_high"])?;
        for (year, count) in counts {
            writer.write_record([year.to_string(), count.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_trend_summary(&self, path: &Path, rows: &[TrendSummaryRow]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["series", "slope_per_day", "kendall_tau", "kendall_p"])?;
        for row in rows {
            let (tau, p) = match row.rank_correlation {
                TrendEstimate::Estimate { tau, p_value } => {
                    (tau.to_string(), p_value.to_string())
                }
                TrendEstimate::Undefined => (String::new(), String::new()),
            };
            writer.write_record([
                row.series.clone(),
                fmt_opt(row.slope_per_day),
                tau,
                p,
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_decomposition(&self, path: &Path, decomposition: &Decomposition) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([DATETIME_COLUMN, "value", "trend", "seasonal", "resid"])?;
        for i in 0..decomposition.len() {
            writer.write_record([
                decomposition.dates[i].to_string(),
                decomposition.values[i].to_string(),
                decomposition.trend[i].to_string(),
                decomposition.seasonal[i].to_string(),
                decomposition.resid[i].to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
