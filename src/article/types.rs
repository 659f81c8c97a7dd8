use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A topic tag attached to an article.
///
/// The slug is the identity used for matching. The primary flag only adds
/// weight when counting or ranking, it never changes identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub slug: String,
    pub label: String,
    #[serde(default, rename = "type")]
    pub topic_type: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl Topic {
    pub fn new(slug: &str, label: &str) -> Self {
        Topic {
            slug: slug.to_string(),
            label: label.to_string(),
            topic_type: None,
            is_primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }
}

/// Identity of the outlet an article came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceIdentity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    // Editorial badge shown next to the source, e.g. "Opinion" or "Official"
    #[serde(default)]
    pub badge: Option<String>,
}

impl SourceIdentity {
    pub fn new(id: &str, name: &str) -> Self {
        SourceIdentity {
            id: id.to_string(),
            name: name.to_string(),
            category: None,
            badge: None,
        }
    }

    pub fn with_badge(mut self, badge: &str) -> Self {
        self.badge = Some(badge.to_string());
        self
    }
}

/// An ingested news record. Immutable once built by the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub topics: Vec<Topic>,
    pub source: SourceIdentity,
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub url: String,
}

impl Article {
    pub fn new(id: &str, title: &str, source: SourceIdentity) -> Self {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            summary: String::new(),
            topics: Vec::new(),
            source,
            published_at: None,
            fetched_at: None,
            url: String::new(),
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn with_topics(mut self, topics: Vec<Topic>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Published time, else fetched time, else `None` for undated records
    pub fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.fetched_at)
    }

    /// Effective timestamp in epoch milliseconds, with undated records at zero
    pub fn effective_millis(&self) -> i64 {
        self.effective_timestamp()
            .map(|ts| ts.timestamp_millis())
            .unwrap_or(0)
    }

    pub fn primary_topic_count(&self) -> usize {
        self.topics.iter().filter(|t| t.is_primary).count()
    }
}
