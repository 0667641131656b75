//! Layout analysis: clustering of page elements and table detection.

pub mod clustering;
pub mod params;
pub mod table;
pub mod words;

pub use params::{ClusteringOptions, WordExtractorOptions};
pub use table::{get_table_candidates, TableCandidate, TableParams};
pub use words::{extract_words, Word};
