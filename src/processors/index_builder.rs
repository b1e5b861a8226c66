use crate::models::{DailySeries, DailyTable};

/// Builds the composite index: the row-wise mean of whichever z-score
/// columns are non-null that day. A day is null only when every component
/// is null, so one pollutant dropping out of coverage never blanks the
/// index.
pub struct IndexBuilder;

impl IndexBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, zscores: &DailyTable) -> DailySeries {
        let values = (0..zscores.len())
            .map(|i| {
                let available: Vec<f64> = zscores.row(i).into_iter().flatten().collect();
                if available.is_empty() {
                    None
                } else {
                    Some(available.iter().sum::<f64>() / available.len() as f64)
                }
            })
            .collect();
        DailySeries::new(zscores.dates().to_vec(), values)
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_mean_of_available_components() {
        let dates: Vec<NaiveDate> = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2021, 1, d).unwrap())
            .collect();
        let mut zscores = DailyTable::new(dates);
        zscores.push_column("SO2_z", vec![Some(1.0), None, None]);
        zscores.push_column("NO2_z", vec![Some(3.0), Some(2.0), None]);

        let index = IndexBuilder::new().build(&zscores);

        // Both present: mean. One present: that value. None: null.
        assert_eq!(index.values()[0], Some(2.0));
        assert_eq!(index.values()[1], Some(2.0));
        assert_eq!(index.values()[2], None);
    }
}
