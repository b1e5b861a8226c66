use crate::config::AggregationConfig;
use crate::models::{DailySeries, HourlyReading};
use chrono::Duration;
use std::collections::BTreeMap;

/// Aggregates an hourly series to daily means under the minimum-valid-hours
/// rule: a day keeps its mean only when enough of its hourly readings are
/// non-null, otherwise the day is null even if some readings exist.
pub struct DailyAggregator {
    min_valid_hours: usize,
}

impl DailyAggregator {
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            min_valid_hours: config.min_valid_hours,
        }
    }

    /// Aggregate readings to one row per calendar day over the input's
    /// full date range. Days without any reading are null rows.
    pub fn aggregate(&self, readings: &[HourlyReading]) -> DailySeries {
        if readings.is_empty() {
            return DailySeries::empty();
        }

        let mut per_day: BTreeMap<chrono::NaiveDate, (f64, usize)> = BTreeMap::new();
        for reading in readings {
            let entry = per_day.entry(reading.timestamp.date()).or_insert((0.0, 0));
            if let Some(value) = reading.value {
                entry.0 += value;
                entry.1 += 1;
            }
        }

        let (first, last) = match (per_day.keys().next(), per_day.keys().next_back()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return DailySeries::empty(),
        };

        let mut dates = Vec::new();
        let mut values = Vec::new();
        let mut day = first;
        while day <= last {
            let mean = match per_day.get(&day) {
                Some(&(sum, count)) if count >= self.min_valid_hours => Some(sum / count as f64),
                _ => None,
            };
            dates.push(day);
            values.push(mean);
            day += Duration::days(1);
        }

        DailySeries::new(dates, values)
    }
}
