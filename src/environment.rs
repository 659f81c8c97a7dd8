use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::clustering::{
    ClusterConfig, CongestionRules, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_WINDOW_HOURS,
};
use crate::curation::{CitationBudget, DEFAULT_MAX_CITATIONS};

pub const SIMILARITY_THRESHOLD_ENV: &str = "STORY_SIMILARITY_THRESHOLD";
pub const WINDOW_HOURS_ENV: &str = "STORY_WINDOW_HOURS";
pub const MAX_EMBEDDING_ARTICLES_ENV: &str = "STORY_MAX_EMBEDDING_ARTICLES";
pub const MAX_CITATIONS_ENV: &str = "STORY_MAX_CITATIONS";
pub const EMBEDDING_CONCURRENCY_ENV: &str = "STORY_EMBEDDING_CONCURRENCY";
pub const CONGESTION_MIN_ARTICLES_ENV: &str = "CONGESTION_MIN_ARTICLES";
pub const CONGESTION_MIN_SOURCES_ENV: &str = "CONGESTION_MIN_SOURCES";
pub const CONGESTION_WINDOW_HOURS_ENV: &str = "CONGESTION_WINDOW_HOURS";

/// Retrieves an environment variable and parses it.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `default`: Value used when the variable is unset or does not parse.
///
/// # Returns
/// - `T`
pub fn get_env_var_or<T>(var: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparseable {}={:?}, using {}", var, raw, default);
                default
            }
        },
        _ => default,
    }
}

/// Settings for one clustering run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub similarity_threshold: f64,
    pub window_hours: i64,
    pub max_embedding_articles: usize,
    // Clamped into range when used, never rejected
    pub max_citations: usize,
    pub embedding_concurrency: usize,
    pub congestion: CongestionRules,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            window_hours: DEFAULT_WINDOW_HOURS,
            max_embedding_articles: 120,
            max_citations: DEFAULT_MAX_CITATIONS,
            embedding_concurrency: 4,
            congestion: CongestionRules::default(),
        }
    }
}

impl RunConfig {
    /// Defaults overridden by whichever `STORY_*` / `CONGESTION_*`
    /// variables are set
    pub fn from_env() -> Self {
        let defaults = RunConfig::default();
        RunConfig {
            similarity_threshold: get_env_var_or(
                SIMILARITY_THRESHOLD_ENV,
                defaults.similarity_threshold,
            ),
            window_hours: get_env_var_or(WINDOW_HOURS_ENV, defaults.window_hours),
            max_embedding_articles: get_env_var_or(
                MAX_EMBEDDING_ARTICLES_ENV,
                defaults.max_embedding_articles,
            ),
            max_citations: get_env_var_or(MAX_CITATIONS_ENV, defaults.max_citations),
            embedding_concurrency: get_env_var_or(
                EMBEDDING_CONCURRENCY_ENV,
                defaults.embedding_concurrency,
            ),
            congestion: CongestionRules {
                min_articles: get_env_var_or(
                    CONGESTION_MIN_ARTICLES_ENV,
                    defaults.congestion.min_articles,
                ),
                min_sources: get_env_var_or(
                    CONGESTION_MIN_SOURCES_ENV,
                    defaults.congestion.min_sources,
                ),
                window_hours: get_env_var_or(
                    CONGESTION_WINDOW_HOURS_ENV,
                    defaults.congestion.window_hours,
                ),
            },
        }
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            similarity_threshold: self.similarity_threshold,
            window_hours: self.window_hours,
        }
    }

    pub fn citation_budget(&self) -> CitationBudget {
        CitationBudget::new(self.max_citations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.similarity_threshold, 0.72);
        assert_eq!(config.window_hours, 48);
        assert_eq!(config.max_embedding_articles, 120);
        assert_eq!(config.citation_budget().get(), 10);
        assert_eq!(config.congestion, CongestionRules::default());
    }

    #[test]
    fn test_out_of_range_citations_are_clamped() {
        let config = RunConfig {
            max_citations: 50,
            ..RunConfig::default()
        };
        assert_eq!(config.citation_budget().get(), 16);
    }

    #[test]
    fn test_env_parsing_falls_back() {
        // Names unique to this test
        env::set_var("STORYLINE_TEST_GOOD", "0.8");
        env::set_var("STORYLINE_TEST_BAD", "eighty");
        assert_eq!(get_env_var_or("STORYLINE_TEST_GOOD", 0.5), 0.8);
        assert_eq!(get_env_var_or("STORYLINE_TEST_BAD", 0.5), 0.5);
        assert_eq!(get_env_var_or("STORYLINE_TEST_UNSET", 7usize), 7);
    }
}
