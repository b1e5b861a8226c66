use crate::analyzers::IndexAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::DailySeries;
use crate::processors::{
    DailyAggregator, DailyMerger, ExtremeDetector, IndexBuilder, RollingNormalizer,
    SeasonalDecomposer, TrendEstimator,
};
use crate::readers::{HourlyReader, TableReader};
use crate::utils::constants::{
    INDEX_FILE, INDEX_NAME, MERGED_DAILY_FILE, STL_FULL_FILE, TREND_SUMMARY_FILE, ZSCORES_FILE,
};
use crate::utils::filename::{
    daily_mean_filename, extremes_filename, stl_year_filename, yearly_counts_filename,
};
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;
use std::path::Path;
use tracing::{info, warn};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest {
            input_dir,
            output_dir,
            so2_file,
            no2_file,
            o3_file,
            pm25_file,
            min_valid_hours,
        } => {
            let mut config = PipelineConfig::default();
            config.aggregation.min_valid_hours = min_valid_hours;
            config.validate()?;

            let files = [
                ("SO2", so2_file),
                ("NO2", no2_file),
                ("O3", o3_file),
                ("PM25", pm25_file),
            ];
            run_ingest(&input_dir, &output_dir, &files, &config)?;
        }

        Commands::Features {
            data_dir,
            window,
            min_periods,
        } => {
            let mut config = PipelineConfig::default();
            config.normalization.window = window;
            config.normalization.min_periods = min_periods;
            config.validate()?;

            run_features(&data_dir, &config)?;
        }

        Commands::Extremes {
            data_dir,
            quantiles,
        } => {
            let mut config = PipelineConfig::default();
            config.extremes.quantiles = quantiles;
            config.validate()?;

            run_extremes(&data_dir, &config)?;
        }

        Commands::Trends {
            data_dir,
            min_samples,
            no_rank_correlation,
        } => {
            let mut config = PipelineConfig::default();
            config.trends.min_samples = min_samples;
            config.trends.rank_correlation = !no_rank_correlation;
            config.validate()?;

            run_trends(&data_dir, &config)?;
        }

        Commands::Decompose {
            data_dir,
            period,
            yearly_period,
            min_yearly_coverage,
        } => {
            let mut config = PipelineConfig::default();
            config.decomposition.full_period = period;
            config.decomposition.yearly_period = yearly_period;
            config.decomposition.min_yearly_coverage = min_yearly_coverage;
            config.validate()?;

            run_decompose(&data_dir, &config)?;
        }

        Commands::Run {
            input_dir,
            output_dir,
            min_valid_hours,
            window,
            min_periods,
            quantiles,
            period,
        } => {
            let mut config = PipelineConfig::default();
            config.aggregation.min_valid_hours = min_valid_hours;
            config.normalization.window = window;
            config.normalization.min_periods = min_periods;
            config.extremes.quantiles = quantiles;
            config.decomposition.full_period = period;
            config.validate()?;

            let files = [
                ("SO2", crate::utils::constants::DEFAULT_SO2_FILE.to_string()),
                ("NO2", crate::utils::constants::DEFAULT_NO2_FILE.to_string()),
                ("O3", crate::utils::constants::DEFAULT_O3_FILE.to_string()),
                (
                    "PM25",
                    crate::utils::constants::DEFAULT_PM25_FILE.to_string(),
                ),
            ];

            // Each stage persists its output before the next one starts.
            run_ingest(&input_dir, &output_dir, &files, &config)?;
            run_features(&output_dir, &config)?;
            run_extremes(&output_dir, &config)?;
            run_trends(&output_dir, &config)?;
            run_decompose(&output_dir, &config)?;
            println!("Pipeline complete");
        }

        Commands::Info { file, column } => {
            let series = TableReader::new().read_daily_series(&file, &column)?;
            let stats = IndexAnalyzer::new().analyze(&column, &series)?;
            println!("{}", stats.summary());
        }
    }

    Ok(())
}

fn run_ingest(
    input_dir: &Path,
    output_dir: &Path,
    files: &[(&str, String)],
    config: &PipelineConfig,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let reader = HourlyReader::new(&config.aggregation);
    let aggregator = DailyAggregator::new(&config.aggregation);
    let writer = CsvWriter::new();

    let progress = ProgressReporter::new(files.len() as u64, "Ingesting hourly exports...", false);
    let mut daily_series: Vec<(String, DailySeries)> = Vec::new();

    for (pollutant, file_name) in files {
        let path = input_dir.join(file_name);
        progress.set_message(&format!("Ingesting {}", path.display()));

        let readings = reader.read_hourly(&path)?;
        let daily = aggregator.aggregate(&readings);
        info!(
            %pollutant,
            readings = readings.len(),
            days = daily.len(),
            covered = daily.coverage(),
            "aggregated to daily means"
        );

        writer.write_daily_series(
            &output_dir.join(daily_mean_filename(pollutant)),
            pollutant,
            &daily,
        )?;
        daily_series.push((pollutant.to_string(), daily));
        progress.inc();
    }

    let merged = DailyMerger::new().merge(&daily_series);
    writer.write_daily_table(&output_dir.join(MERGED_DAILY_FILE), &merged)?;
    progress.finish_with_message(&format!(
        "Wrote {} ({} rows)",
        output_dir.join(MERGED_DAILY_FILE).display(),
        merged.len()
    ));
    Ok(())
}

fn run_features(data_dir: &Path, config: &PipelineConfig) -> Result<()> {
    let merged = TableReader::new().read_daily_table(&data_dir.join(MERGED_DAILY_FILE))?;
    let writer = CsvWriter::new();

    let zscores = RollingNormalizer::new(&config.normalization).normalize(&merged);
    writer.write_daily_table(&data_dir.join(ZSCORES_FILE), &zscores)?;

    let index = IndexBuilder::new().build(&zscores);
    writer.write_daily_series(&data_dir.join(INDEX_FILE), INDEX_NAME, &index)?;

    info!(
        days = index.len(),
        covered = index.coverage(),
        "computed z-scores and composite index"
    );
    println!(
        "Wrote {} and {}",
        data_dir.join(ZSCORES_FILE).display(),
        data_dir.join(INDEX_FILE).display()
    );
    Ok(())
}

fn run_extremes(data_dir: &Path, config: &PipelineConfig) -> Result<()> {
    let index = TableReader::new().read_daily_series(&data_dir.join(INDEX_FILE), INDEX_NAME)?;
    let detector = ExtremeDetector::new();
    let writer = CsvWriter::new();

    for &q in &config.extremes.quantiles {
        let Some(table) = detector.detect(&index, q) else {
            warn!(quantile = q, "no non-null index history; skipping quantile");
            continue;
        };

        writer.write_extremes(&data_dir.join(extremes_filename(q)), &table)?;
        let counts = detector.yearly_counts(&table);
        writer.write_yearly_counts(&data_dir.join(yearly_counts_filename(q)), &counts)?;

        info!(
            quantile = q,
            threshold = table.threshold,
            flagged = table.flagged_count(),
            "flagged extremes"
        );
    }
    println!("Wrote extreme-flag tables to {}", data_dir.display());
    Ok(())
}

fn run_trends(data_dir: &Path, config: &PipelineConfig) -> Result<()> {
    let reader = TableReader::new();
    let merged = reader.read_daily_table(&data_dir.join(MERGED_DAILY_FILE))?;
    let index = reader.read_daily_series(&data_dir.join(INDEX_FILE), INDEX_NAME)?;

    let rows = TrendEstimator::new(&config.trends).summarize(&merged, INDEX_NAME, &index);
    CsvWriter::new().write_trend_summary(&data_dir.join(TREND_SUMMARY_FILE), &rows)?;

    println!("Wrote {}", data_dir.join(TREND_SUMMARY_FILE).display());
    Ok(())
}

fn run_decompose(data_dir: &Path, config: &PipelineConfig) -> Result<()> {
    let index = TableReader::new().read_daily_series(&data_dir.join(INDEX_FILE), INDEX_NAME)?;
    let decomposer = SeasonalDecomposer::new(&config.decomposition);
    let writer = CsvWriter::new();

    let full = decomposer.decompose(INDEX_NAME, &index, config.decomposition.full_period)?;
    writer.write_decomposition(&data_dir.join(STL_FULL_FILE), &full)?;
    info!(
        period = full.period,
        points = full.len(),
        "decomposed full history"
    );

    for (year, decomposition) in decomposer.decompose_by_year(INDEX_NAME, &index)? {
        writer.write_decomposition(&data_dir.join(stl_year_filename(year)), &decomposition)?;
        info!(year, points = decomposition.len(), "decomposed year");
    }

    println!("Wrote decomposition tables to {}", data_dir.display());
    Ok(())
}
