use crate::models::{DailySeries, DailyTable};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Outer-joins per-pollutant daily series on the day axis.
///
/// The merged table carries a row for the union of all dates seen by any
/// pollutant, with nulls where a pollutant has no value that day.
pub struct DailyMerger;

impl DailyMerger {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(&self, series: &[(String, DailySeries)]) -> DailyTable {
        let mut all_dates: BTreeSet<NaiveDate> = BTreeSet::new();
        for (_, s) in series {
            all_dates.extend(s.dates().iter().copied());
        }
        let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

        let mut table = DailyTable::new(dates.clone());
        for (name, s) in series {
            let by_date: HashMap<NaiveDate, Option<f64>> = s.iter().collect();
            let column = dates
                .iter()
                .map(|d| by_date.get(d).copied().flatten())
                .collect();
            table.push_column(name, column);
        }
        table
    }
}

impl Default for DailyMerger {
    fn default() -> Self {
        Self::new()
    }
}
