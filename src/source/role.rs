use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::registry::SourceRegistry;
use crate::article::Article;

lazy_static! {
    // Opinion-language markers. Matching any of them in a title makes the
    // article opinion regardless of what the registry says about its source.
    static ref OPINION_MARKERS: Regex =
        Regex::new(r"(?i)\b(op-ed|commentary|editorial|viewpoint|column)\b")
            .expect("opinion marker pattern is valid");
}

/// Editorial role of a source or article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryRole {
    Reporting,
    Official,
    Analysis,
    Opinion,
    Unknown,
}

impl StoryRole {
    /// Ranking weight used by representative selection and curation
    pub fn priority(&self) -> u8 {
        match self {
            StoryRole::Reporting => 4,
            StoryRole::Official => 3,
            StoryRole::Analysis => 2,
            StoryRole::Opinion => 1,
            StoryRole::Unknown => 0,
        }
    }

    /// Parses a registry value or source badge, `None` when unrecognised
    pub fn parse(value: &str) -> Option<StoryRole> {
        match value.trim().to_lowercase().as_str() {
            "reporting" | "news" | "report" => Some(StoryRole::Reporting),
            "official" | "government" | "press release" => Some(StoryRole::Official),
            "analysis" => Some(StoryRole::Analysis),
            "opinion" => Some(StoryRole::Opinion),
            _ => None,
        }
    }
}

impl fmt::Display for StoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryRole::Reporting => write!(f, "reporting"),
            StoryRole::Official => write!(f, "official"),
            StoryRole::Analysis => write!(f, "analysis"),
            StoryRole::Opinion => write!(f, "opinion"),
            StoryRole::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for StoryRole {
    fn from(s: &str) -> Self {
        StoryRole::parse(s).unwrap_or(StoryRole::Unknown)
    }
}

pub fn has_opinion_language(title: &str) -> bool {
    OPINION_MARKERS.is_match(title)
}

/// Resolves the role of an article: the registry's base role for its
/// source (or the source badge when the registry has no entry), overridden
/// to opinion when the title reads like opinion.
pub fn resolve_role(article: &Article, registry: &dyn SourceRegistry) -> StoryRole {
    let base = registry
        .lookup(&article.source.id)
        .map(|profile| profile.role)
        .or_else(|| article.source.badge.as_deref().and_then(StoryRole::parse))
        .unwrap_or(StoryRole::Unknown);

    if has_opinion_language(&article.title) {
        StoryRole::Opinion
    } else {
        base
    }
}
