use serde::{Deserialize, Serialize};

use crate::article::Article;

/// One article's membership in a story cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMember {
    pub article: Article,
    // Similarity to the representative; exactly 1.0 for the representative
    pub similarity: f64,
    pub is_representative: bool,
}

/// Struct representing a group of articles covering the same event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryCluster {
    pub cluster_key: String,
    pub representative: Article,
    pub members: Vec<ClusterMember>,
    pub dominant_topic: Option<String>,
}

impl StoryCluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.article.id.as_str()).collect()
    }

    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.members.iter().map(|m| &m.article)
    }
}
