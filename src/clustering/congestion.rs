use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::StoryCluster;
use crate::source::source_identity_key;

// Blend weights for the congestion score
const VOLUME_WEIGHT: f64 = 0.6;
const DIVERSITY_WEIGHT: f64 = 0.4;

/// Thresholds for flagging a story as heavily covered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CongestionRules {
    pub min_articles: usize,
    pub min_sources: usize,
    pub window_hours: i64,
}

impl Default for CongestionRules {
    fn default() -> Self {
        CongestionRules {
            min_articles: 10,
            min_sources: 6,
            window_hours: 24,
        }
    }
}

/// Coverage volume and diversity of a cluster over a trailing window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CongestionEvaluation {
    pub article_count: usize,
    pub unique_sources: usize,
    pub congestion_score: f64,
    pub is_congested: bool,
}

fn saturation(count: usize, threshold: usize) -> f64 {
    if threshold == 0 {
        return 1.0;
    }
    (count as f64 / threshold as f64).min(1.0)
}

/// Evaluates congestion for a cluster as of `now`.
///
/// Only members with an effective timestamp at or after
/// `now - window_hours` count. The flag needs both thresholds met; the score
/// is a rounded blend of the two saturations and never sets the flag alone.
pub fn evaluate_congestion(
    cluster: &StoryCluster,
    now: DateTime<Utc>,
    rules: &CongestionRules,
) -> CongestionEvaluation {
    let window_ms = rules.window_hours.max(0).saturating_mul(3_600_000);
    let cutoff = now.timestamp_millis().saturating_sub(window_ms);

    let in_window: Vec<_> = cluster
        .articles()
        .filter(|article| article.effective_millis() >= cutoff)
        .collect();

    let article_count = in_window.len();
    let unique_sources = in_window
        .iter()
        .map(|article| source_identity_key(&article.source))
        .collect::<HashSet<_>>()
        .len();

    let blended = VOLUME_WEIGHT * saturation(article_count, rules.min_articles)
        + DIVERSITY_WEIGHT * saturation(unique_sources, rules.min_sources);
    let congestion_score = (blended * 1000.0).round() / 1000.0;

    CongestionEvaluation {
        article_count,
        unique_sources,
        congestion_score,
        is_congested: article_count >= rules.min_articles && unique_sources >= rules.min_sources,
    }
}
