use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::article::Article;
use crate::source::{resolve_role, SourceRegistry};

/// Maximum length of the title slug in a cluster key
pub const CLUSTER_KEY_SLUG_LENGTH: usize = 68;

// Per-mention weights when picking the dominant topic
const PRIMARY_TOPIC_WEIGHT: u32 = 2;
const SECONDARY_TOPIC_WEIGHT: u32 = 1;

/// Orders two articles for representative selection, best first.
///
/// Role priority, then number of primary topics, then newest effective
/// timestamp, then id so the ordering is total.
pub fn compare_for_representative(
    a: &Article,
    b: &Article,
    registry: &dyn SourceRegistry,
) -> Ordering {
    let role_a = resolve_role(a, registry).priority();
    let role_b = resolve_role(b, registry).priority();

    role_b
        .cmp(&role_a)
        .then_with(|| b.primary_topic_count().cmp(&a.primary_topic_count()))
        .then_with(|| b.effective_millis().cmp(&a.effective_millis()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Picks the canonical article of a cluster
///
/// # Arguments
/// * `articles` - Cluster members, in any order
/// * `registry` - Source role lookup
///
/// # Returns
/// * `Option<usize>` - Index of the representative, `None` for an empty slice
pub fn select_representative(articles: &[&Article], registry: &dyn SourceRegistry) -> Option<usize> {
    (0..articles.len()).min_by(|&i, &j| {
        compare_for_representative(articles[i], articles[j], registry)
    })
}

/// Lowercase, alphanumeric-only, hyphen-separated form of a title, cut to
/// `max_len` characters
pub fn slugify(title: &str, max_len: usize) -> String {
    let spaced: String = title
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' {
                Some(' ')
            } else {
                None
            }
        })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("-");
    let truncated: String = joined.chars().take(max_len).collect();
    truncated.trim_matches('-').to_string()
}

/// Stable key for a cluster derived only from its representative:
/// `<title-slug>-<YYYYMMDD>`, with `story` and `undated` as fallbacks.
pub fn derive_cluster_key(representative: &Article) -> String {
    let slug = slugify(&representative.title, CLUSTER_KEY_SLUG_LENGTH);
    let slug = if slug.is_empty() { "story".to_string() } else { slug };

    let stamp = representative
        .effective_timestamp()
        .map(|ts| ts.format("%Y%m%d").to_string())
        .unwrap_or_else(|| "undated".to_string());

    format!("{}-{}", slug, stamp)
}

/// Label with the highest summed weight across members (primary mentions
/// count double); ties go to the lexicographically smallest label.
pub fn dominant_topic<'a, I>(articles: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Article>,
{
    let mut weights: BTreeMap<&str, u32> = BTreeMap::new();
    for article in articles {
        for topic in &article.topics {
            let weight = if topic.is_primary {
                PRIMARY_TOPIC_WEIGHT
            } else {
                SECONDARY_TOPIC_WEIGHT
            };
            *weights.entry(topic.label.as_str()).or_insert(0) += weight;
        }
    }

    // BTreeMap iterates labels in order, so a strict > keeps the first label
    let mut best: Option<(&str, u32)> = None;
    for (label, weight) in weights {
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((label, weight)),
        }
    }

    best.map(|(label, _)| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{SourceIdentity, Topic};
    use crate::source::{SourceProfile, StaticSourceRegistry, StoryRole};
    use chrono::{Duration, TimeZone, Utc};

    fn registry() -> StaticSourceRegistry {
        StaticSourceRegistry::new()
            .with("wire", SourceProfile::new(1, StoryRole::Reporting))
            .with("dod", SourceProfile::new(1, StoryRole::Official))
            .with("think-tank", SourceProfile::new(2, StoryRole::Analysis))
    }

    fn article(id: &str, source: &str, title: &str, hours_ago: i64) -> Article {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Article::new(id, title, SourceIdentity::new(source, source))
            .with_published_at(now - Duration::hours(hours_ago))
    }

    #[test]
    fn test_role_beats_recency() {
        let registry = registry();
        let official = article("o", "dod", "DoD awards contract", 0);
        let reporting = article("r", "wire", "Navy wins contract", 5);
        let members = vec![&official, &reporting];

        assert_eq!(select_representative(&members, &registry), Some(1));
    }

    #[test]
    fn test_primary_topics_then_recency() {
        let registry = registry();
        let tagged = article("a", "wire", "Story", 10)
            .with_topics(vec![Topic::new("navy", "Navy").primary()]);
        let newer = article("b", "wire", "Story", 1);
        let newest = article("c", "wire", "Story", 0);

        let members = vec![&newer, &tagged, &newest];
        assert_eq!(select_representative(&members, &registry), Some(1));

        let members = vec![&newer, &newest];
        assert_eq!(select_representative(&members, &registry), Some(1));
        assert_eq!(select_representative(&[], &registry), None);
    }

    #[test]
    fn test_opinion_title_loses_to_analysis() {
        let registry = registry();
        let column = article("a", "wire", "Column: why the contract matters", 0);
        let analysis = article("b", "think-tank", "What the contract means", 3);

        let members = vec![&column, &analysis];
        assert_eq!(select_representative(&members, &registry), Some(1));
    }

    #[test]
    fn test_cluster_key() {
        let rep = article("a", "wire", "Navy awards $2B missile contract", 0);
        assert_eq!(
            derive_cluster_key(&rep),
            "navy-awards-2b-missile-contract-20250601"
        );
        assert_eq!(derive_cluster_key(&rep), derive_cluster_key(&rep.clone()));

        let blank = Article::new("b", "  ?! ", SourceIdentity::new("s", "S"));
        assert_eq!(derive_cluster_key(&blank), "story-undated");
    }

    #[test]
    fn test_slug_truncation_trims_hyphens() {
        let long_title = "word ".repeat(30);
        let slug = slugify(&long_title, CLUSTER_KEY_SLUG_LENGTH);
        assert!(slug.chars().count() <= CLUSTER_KEY_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
        assert!(!slug.starts_with('-'));
        assert_eq!(slugify(" -- Hello --  World -- ", 68), "hello-world");
    }

    #[test]
    fn test_dominant_topic() {
        let a = article("a", "wire", "A", 0).with_topics(vec![
            Topic::new("navy", "Navy").primary(),
            Topic::new("budget", "Budget"),
        ]);
        let b = article("b", "wire", "B", 0).with_topics(vec![Topic::new("budget", "Budget")]);
        let c = article("c", "wire", "C", 0).with_topics(vec![Topic::new("army", "Army")]);

        // Navy 2, Budget 2: tie goes to "Budget"
        assert_eq!(dominant_topic([&a, &b]), Some("Budget".to_string()));
        assert_eq!(dominant_topic([&a]), Some("Navy".to_string()));
        assert_eq!(dominant_topic([&c]), Some("Army".to_string()));

        let bare = article("d", "wire", "D", 0);
        assert_eq!(dominant_topic([&bare]), None);
    }
}
