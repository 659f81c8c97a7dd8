use serde::{Deserialize, Serialize};

use crate::source::StoryRole;

/// A cluster member chosen to support a generated summary.
///
/// `source_role` is one of the four editorial roles, or `unknown` for a
/// member whose source is unregistered and carries no badge. Those only
/// appear when no member fits a role quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub article_id: String,
    pub headline: String,
    pub source_name: String,
    pub url: String,
    pub source_role: StoryRole,
}

/// Number of selected citations per role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub reporting: usize,
    pub official: usize,
    pub analysis: usize,
    pub opinion: usize,
}

impl RoleCounts {
    pub fn record(&mut self, role: StoryRole) {
        match role {
            StoryRole::Reporting => self.reporting += 1,
            StoryRole::Official => self.official += 1,
            StoryRole::Analysis => self.analysis += 1,
            StoryRole::Opinion => self.opinion += 1,
            StoryRole::Unknown => {}
        }
    }
}

/// How a citation list was put together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationSummary {
    pub role_counts: RoleCounts,
    pub has_official_source: bool,
    pub press_release_driven: bool,
    // Opinion pieces existed but not all of them made the list
    pub opinion_limited: bool,
    pub source_diversity: usize,
}
