pub mod registry;
pub mod role;

pub use registry::{SourceProfile, SourceRegistry, StaticSourceRegistry};
pub use role::{resolve_role, StoryRole};

use unicode_normalization::UnicodeNormalization;

use crate::article::SourceIdentity;

// Module-level constants
pub const TARGET_SOURCE: &str = "source";

/// Canonical form of a source name used for citation deduplication:
/// NFKC, lowercase, single spaces. Blank names fall back to the source id.
pub fn normalize_source_name(source: &SourceIdentity) -> String {
    let normalized = collapse(&source.name);
    if normalized.is_empty() {
        collapse(&source.id)
    } else {
        normalized
    }
}

/// Identity used to count distinct sources: the id, else the normalized name
pub fn source_identity_key(source: &SourceIdentity) -> String {
    let id = source.id.trim();
    if id.is_empty() {
        normalize_source_name(source)
    } else {
        id.to_string()
    }
}

fn collapse(value: &str) -> String {
    value
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
