pub mod ingest;
pub mod types;

pub use ingest::{ingest_values, load_articles, parse_timestamp, RawArticle};
pub use types::*;

// Module-level constants
pub const TARGET_INGEST: &str = "ingest";
