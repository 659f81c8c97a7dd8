pub mod curator;
pub mod markers;
pub mod types;

pub use curator::{clamp_max_citations, curate_citations, CitationBudget};
pub use types::*;

pub const TARGET_CURATION: &str = "curation";

pub const DEFAULT_MAX_CITATIONS: usize = 10;
pub const MAX_CITATIONS_FLOOR: usize = 3;
pub const MAX_CITATIONS_CEILING: usize = 16;
