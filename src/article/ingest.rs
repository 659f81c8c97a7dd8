use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use super::types::{Article, SourceIdentity, Topic};
use super::TARGET_INGEST;

/// A topic as upstream feeds send it: either a bare slug or a full object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTopic {
    Slug(String),
    Detailed {
        slug: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default, rename = "type")]
        topic_type: Option<String>,
        #[serde(default, alias = "is_primary", alias = "isPrimary")]
        primary: Option<bool>,
    },
}

/// Some feeds send a single topic, others a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TopicField {
    // Tried first: a detailed topic would otherwise accept a list positionally
    Many(Vec<RawTopic>),
    One(RawTopic),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
}

/// Loosely shaped upstream record, before normalization
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, alias = "topic")]
    pub topics: Option<TopicField>,
    #[serde(default)]
    pub source: RawSource,
    #[serde(default, alias = "published_at")]
    pub published_at: Option<String>,
    #[serde(default, alias = "fetched_at")]
    pub fetched_at: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawArticle {
    /// Normalizes the record into an immutable `Article`.
    ///
    /// Missing fields degrade to empty values and unparseable timestamps to
    /// `None`; this never fails.
    pub fn into_article(self) -> Article {
        let summary = self
            .summary
            .filter(|s| !s.trim().is_empty())
            .or(self.excerpt)
            .unwrap_or_default();

        let source_id = self.source.id.unwrap_or_default();
        let source_name = self
            .source
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| source_id.clone());

        let published_at = self.published_at.as_deref().and_then(parse_timestamp);
        let fetched_at = self.fetched_at.as_deref().and_then(parse_timestamp);

        Article {
            topics: normalize_topics(self.topics),
            title: self.title.unwrap_or_default().trim().to_string(),
            summary: summary.trim().to_string(),
            source: SourceIdentity {
                id: source_id.trim().to_string(),
                name: source_name.trim().to_string(),
                category: self.source.category,
                badge: self.source.badge,
            },
            published_at,
            fetched_at,
            url: self.url.unwrap_or_default(),
            id: self.id,
        }
    }
}

/// Flattens either topic shape into an ordered list, keeping the first
/// occurrence of each slug. A repeated slug still promotes the kept topic to
/// primary if any occurrence was primary.
pub fn normalize_topics(field: Option<TopicField>) -> Vec<Topic> {
    let raw = match field {
        None => Vec::new(),
        Some(TopicField::One(topic)) => vec![topic],
        Some(TopicField::Many(topics)) => topics,
    };

    let mut topics: Vec<Topic> = Vec::with_capacity(raw.len());
    for raw_topic in raw {
        let topic = match raw_topic {
            RawTopic::Slug(slug) => Topic::new(slug.trim(), slug.trim()),
            RawTopic::Detailed {
                slug,
                label,
                topic_type,
                primary,
            } => {
                let slug = slug.trim().to_string();
                let label = label
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| slug.clone());
                Topic {
                    slug,
                    label,
                    topic_type,
                    is_primary: primary.unwrap_or(false),
                }
            }
        };

        if topic.slug.is_empty() {
            continue;
        }

        match topics.iter_mut().find(|t| t.slug == topic.slug) {
            Some(existing) => existing.is_primary |= topic.is_primary,
            None => topics.push(topic),
        }
    }

    topics
}

/// Parses the timestamp formats seen across feeds into UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }

    if let Ok(datetime) = DateTime::parse_from_rfc2822(value) {
        return Some(datetime.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    debug!(target: TARGET_INGEST, "Unparseable timestamp: {}", value);
    None
}

/// Normalizes a batch of JSON values, skipping records that do not
/// deserialize and dropping repeated ids after the first occurrence.
pub fn ingest_values(values: Vec<Value>) -> Vec<Article> {
    let mut seen = HashSet::new();
    let mut articles = Vec::with_capacity(values.len());

    for (position, value) in values.into_iter().enumerate() {
        let raw: RawArticle = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(target: TARGET_INGEST, "Skipping malformed record at position {}: {}", position, e);
                continue;
            }
        };

        if !seen.insert(raw.id.clone()) {
            warn!(target: TARGET_INGEST, "Dropping duplicate article id {}", raw.id);
            continue;
        }

        articles.push(raw.into_article());
    }

    articles
}

/// Reads a JSON array of article records from disk
pub fn load_articles(path: &Path) -> Result<Vec<Article>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read article batch {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&data)
        .with_context(|| format!("Article batch {} is not a JSON array", path.display()))?;

    Ok(ingest_values(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use serde_json::json;

    #[test]
    fn test_single_topic_and_list_normalize_alike() {
        let single: RawArticle = serde_json::from_value(json!({
            "id": "a1",
            "title": "Navy awards contract",
            "topic": { "slug": "navy", "label": "Navy", "isPrimary": true }
        }))
        .unwrap();
        let many: RawArticle = serde_json::from_value(json!({
            "id": "a2",
            "title": "Navy awards contract",
            "topics": [{ "slug": "navy", "label": "Navy", "isPrimary": true }]
        }))
        .unwrap();

        assert_eq!(single.into_article().topics, many.into_article().topics);
    }

    #[test]
    fn test_bare_slug_topics_and_duplicates() {
        let raw: RawArticle = serde_json::from_value(json!({
            "id": "a1",
            "topics": ["missiles", { "slug": "missiles", "primary": true }, " ", "navy"]
        }))
        .unwrap();

        let article = raw.into_article();
        let slugs: Vec<&str> = article.topics.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["missiles", "navy"]);
        assert!(article.topics[0].is_primary);
        assert_eq!(article.topics[0].label, "missiles");
    }

    #[test]
    fn test_missing_fields_degrade() {
        let raw: RawArticle = serde_json::from_value(json!({
            "id": "a1",
            "excerpt": "An excerpt",
            "source": { "id": "src-1" },
            "publishedAt": "not a date"
        }))
        .unwrap();

        let article = raw.into_article();
        assert_eq!(article.title, "");
        assert_eq!(article.summary, "An excerpt");
        assert_eq!(article.source.name, "src-1");
        assert!(article.topics.is_empty());
        assert_eq!(article.published_at, None);
        assert_eq!(article.effective_timestamp(), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 4, 29, 5, 17, 23).unwrap();
        assert_eq!(parse_timestamp("2025-04-29T05:17:23+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-04-29T05:17:23Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-04-29T05:17:23"), Some(expected));
        assert_eq!(parse_timestamp("2025-04-29 05:17:23"), Some(expected));
        assert_eq!(
            parse_timestamp("Tue, 29 Apr 2025 05:17:23 +0000"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("2025-04-29").map(|d| d.day()), Some(29));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_ingest_values_skips_malformed_and_duplicates() {
        let values = vec![
            json!({ "id": "a1", "title": "First" }),
            json!({ "title": "No id" }),
            json!({ "id": "a1", "title": "Repeat" }),
            json!({ "id": "a2", "title": "Second" }),
        ];

        let articles = ingest_values(values);
        let ids: Vec<&str> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert_eq!(articles[0].title, "First");
    }
}
