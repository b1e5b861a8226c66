use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error(
        "No date column found in '{file}' (detected header row {header_row} via {rule}). \
         Columns present: {columns:?}"
    )]
    MissingDateColumn {
        file: String,
        header_row: usize,
        rule: String,
        columns: Vec<String>,
    },

    #[error(
        "No hour columns found in '{file}' (expected H01..H24, detected header row {header_row}). \
         Columns present: {columns:?}"
    )]
    MissingHourColumns {
        file: String,
        header_row: usize,
        columns: Vec<String>,
    },

    #[error("Column '{column}' not found in '{file}'. Columns present: {columns:?}")]
    MissingColumn {
        file: String,
        column: String,
        columns: Vec<String>,
    },

    #[error("Series '{0}' is empty or all null; run the upstream stage first")]
    EmptySeries(String),

    #[error("Not enough data to decompose '{series}': {samples} samples for period {period}")]
    InsufficientData {
        series: String,
        samples: usize,
        period: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
