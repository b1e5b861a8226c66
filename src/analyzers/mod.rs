pub mod index_analyzer;

pub use index_analyzer::{IndexAnalyzer, IndexStatistics};
