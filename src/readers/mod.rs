pub mod hourly_reader;
pub mod table_reader;

pub use hourly_reader::{HeaderRule, HourlyReader};
pub use table_reader::TableReader;
