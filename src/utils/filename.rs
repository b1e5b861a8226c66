/// Tag a quantile for file naming: the quantile scaled by 1000, rendered
/// as an integer (0.95 -> "950").
pub fn quantile_tag(q: f64) -> String {
    format!("{}", (q * 1000.0).round() as u32)
}

/// File name of the per-quantile extreme-flag table.
pub fn extremes_filename(q: f64) -> String {
    format!("dpbi_extremes_{}.csv", quantile_tag(q))
}

/// File name of the per-quantile yearly-count companion table.
pub fn yearly_counts_filename(q: f64) -> String {
    format!("dpbi_extremes_{}_yearly_counts.csv", quantile_tag(q))
}

/// File name of a per-year decomposition table.
pub fn stl_year_filename(year: i32) -> String {
    format!("dpbi_stl_components_{}.csv", year)
}

/// File name of the per-pollutant daily mean table.
pub fn daily_mean_filename(pollutant: &str) -> String {
    format!("{}_daily_mean.csv", pollutant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_tags() {
        assert_eq!(quantile_tag(0.90), "900");
        assert_eq!(quantile_tag(0.95), "950");
        assert_eq!(quantile_tag(0.975), "975");
    }

    #[test]
    fn test_filenames() {
        assert_eq!(extremes_filename(0.95), "dpbi_extremes_950.csv");
        assert_eq!(
            yearly_counts_filename(0.975),
            "dpbi_extremes_975_yearly_counts.csv"
        );
        assert_eq!(stl_year_filename(2022), "dpbi_stl_components_2022.csv");
        assert_eq!(daily_mean_filename("SO2"), "SO2_daily_mean.csv");
    }
}
