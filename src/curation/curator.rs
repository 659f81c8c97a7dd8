use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use super::markers::has_press_release_language;
use super::types::{Citation, CurationSummary, RoleCounts};
use super::{
    DEFAULT_MAX_CITATIONS, MAX_CITATIONS_CEILING, MAX_CITATIONS_FLOOR, TARGET_CURATION,
};
use crate::clustering::{ClusterMember, StoryCluster};
use crate::source::{normalize_source_name, resolve_role, SourceRegistry, StoryRole};

// Per-role quotas of the greedy pass
const REPORTING_QUOTA: usize = 2;
const OFFICIAL_QUOTA: usize = 1;
const ANALYSIS_QUOTA: usize = 1;
const OPINION_QUOTA: usize = 1;

/// Share of official members that marks a story as press-release driven
const OFFICIAL_SHARE_THRESHOLD: f64 = 0.30;

/// Clamps a requested citation budget into the supported range
pub fn clamp_max_citations(requested: usize) -> usize {
    requested.clamp(MAX_CITATIONS_FLOOR, MAX_CITATIONS_CEILING)
}

/// A citation budget that is always within range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationBudget(usize);

impl CitationBudget {
    pub fn new(requested: usize) -> Self {
        CitationBudget(clamp_max_citations(requested))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for CitationBudget {
    fn default() -> Self {
        CitationBudget(DEFAULT_MAX_CITATIONS)
    }
}

/// A cluster member prepared for selection
#[derive(Debug)]
struct Candidate<'a> {
    member: &'a ClusterMember,
    role: StoryRole,
    quality: f64,
    source_key: String,
    millis: i64,
}

impl Candidate<'_> {
    fn id(&self) -> &str {
        &self.member.article.id
    }

    fn to_citation(&self) -> Citation {
        let article = &self.member.article;
        let headline = if article.title.trim().is_empty() {
            "Untitled".to_string()
        } else {
            article.title.clone()
        };

        Citation {
            article_id: article.id.clone(),
            headline,
            source_name: article.source.name.clone(),
            url: article.url.clone(),
            source_role: self.role,
        }
    }
}

/// Role priority, quality, representative, recency
fn ranked(a: &Candidate, b: &Candidate) -> Ordering {
    b.role
        .priority()
        .cmp(&a.role.priority())
        .then_with(|| b.quality.total_cmp(&a.quality))
        .then_with(|| {
            b.member
                .is_representative
                .cmp(&a.member.is_representative)
        })
        .then_with(|| b.millis.cmp(&a.millis))
        .then_with(|| a.id().cmp(b.id()))
}

/// Quality first; used for the open pool once role quotas are filled
fn ranked_by_quality(a: &Candidate, b: &Candidate) -> Ordering {
    b.quality
        .total_cmp(&a.quality)
        .then_with(|| b.role.priority().cmp(&a.role.priority()))
        .then_with(|| {
            b.member
                .is_representative
                .cmp(&a.member.is_representative)
        })
        .then_with(|| b.millis.cmp(&a.millis))
        .then_with(|| a.id().cmp(b.id()))
}

/// Greedy selection state: picked candidates plus the sources they use
struct Selection<'c, 'a> {
    picked: Vec<&'c Candidate<'a>>,
    used_sources: HashSet<&'c str>,
}

impl<'c, 'a> Selection<'c, 'a> {
    fn new() -> Self {
        Selection {
            picked: Vec::new(),
            used_sources: HashSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.picked.len()
    }

    fn opinion_count(&self) -> usize {
        self.picked
            .iter()
            .filter(|c| c.role == StoryRole::Opinion)
            .count()
    }

    /// Takes up to `limit` candidates from `pool` whose source is unused
    fn take<I>(&mut self, pool: I, limit: usize) -> usize
    where
        I: IntoIterator<Item = &'c Candidate<'a>>,
    {
        let mut taken = 0;
        for candidate in pool {
            if taken >= limit {
                break;
            }
            if self.used_sources.insert(candidate.source_key.as_str()) {
                self.picked.push(candidate);
                taken += 1;
            }
        }
        taken
    }
}

/// Decides whether a story is mostly an official announcement
fn is_press_release_driven(cluster: &StoryCluster, candidates: &[Candidate]) -> bool {
    let official = candidates
        .iter()
        .filter(|c| c.role == StoryRole::Official)
        .count();
    if official == 0 {
        return false;
    }

    let representative = &cluster.representative;
    let text = format!("{} {}", representative.title, representative.summary);
    if has_press_release_language(&text) {
        return true;
    }

    official as f64 / candidates.len() as f64 >= OFFICIAL_SHARE_THRESHOLD
}

/// Builds the citation list for a cluster.
///
/// Selection runs in role quotas: two reporting, one official when the story
/// is press-release driven, one analysis, then the open pool up to the
/// budget minus one slot held back for a single opinion piece. No two
/// citations share a normalized source name and at most one is opinion.
///
/// # Arguments
/// * `cluster` - The story cluster to cite
/// * `budget` - Maximum number of citations
/// * `registry` - Source role and quality lookup
///
/// # Returns
/// * `(Vec<Citation>, CurationSummary)` - Citations in selection order and
///   a summary of how they were chosen
pub fn curate_citations(
    cluster: &StoryCluster,
    budget: CitationBudget,
    registry: &dyn SourceRegistry,
) -> (Vec<Citation>, CurationSummary) {
    let max_citations = budget.get();

    let mut candidates: Vec<Candidate> = cluster
        .members
        .iter()
        .map(|member| Candidate {
            member,
            role: resolve_role(&member.article, registry),
            quality: registry.quality_weight(&member.article.source.id),
            source_key: normalize_source_name(&member.article.source),
            millis: member.article.effective_millis(),
        })
        .collect();
    candidates.sort_by(ranked);

    if candidates.is_empty() {
        return (Vec::new(), CurationSummary::default());
    }

    let press_release_driven = is_press_release_driven(cluster, &candidates);
    let by_role = |role: StoryRole| candidates.iter().filter(move |c| c.role == role);
    let opinion_available = by_role(StoryRole::Opinion).count();

    let mut selection = Selection::new();

    // Step 1-3: role quotas
    selection.take(by_role(StoryRole::Reporting), REPORTING_QUOTA);
    if press_release_driven {
        selection.take(by_role(StoryRole::Official), OFFICIAL_QUOTA);
    }
    selection.take(by_role(StoryRole::Analysis), ANALYSIS_QUOTA);

    // Step 4: open pool, holding one slot back for opinion
    let opinion_reserve = if opinion_available > 0 { OPINION_QUOTA } else { 0 };
    let remaining = max_citations.saturating_sub(selection.len() + opinion_reserve);
    if remaining > 0 {
        let mut pool: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| {
                matches!(
                    c.role,
                    StoryRole::Reporting | StoryRole::Official | StoryRole::Analysis
                )
            })
            .collect();
        pool.sort_by(|a, b| ranked_by_quality(a, b));
        selection.take(pool, remaining);
    }

    // Step 5: the reserved opinion slot
    if opinion_reserve > 0 {
        selection.take(by_role(StoryRole::Opinion), OPINION_QUOTA);
    }

    // Step 6: nothing fit the quotas, fall back to the ranked list
    if selection.picked.is_empty() {
        debug!(
            target: TARGET_CURATION,
            "No quota matches for cluster {}, using ranked fallback",
            cluster.cluster_key
        );
        for candidate in candidates.iter() {
            if selection.len() >= max_citations {
                break;
            }
            if candidate.role == StoryRole::Opinion && selection.opinion_count() >= OPINION_QUOTA {
                continue;
            }
            selection.take(std::iter::once(candidate), 1);
        }
    }

    selection.picked.truncate(max_citations);

    let mut role_counts = RoleCounts::default();
    for candidate in &selection.picked {
        role_counts.record(candidate.role);
    }
    let source_diversity = selection
        .picked
        .iter()
        .map(|c| c.source_key.as_str())
        .collect::<HashSet<_>>()
        .len();

    let summary = CurationSummary {
        role_counts,
        has_official_source: role_counts.official > 0,
        press_release_driven,
        opinion_limited: opinion_available > 0 && role_counts.opinion < opinion_available,
        source_diversity,
    };

    let citations: Vec<Citation> = selection.picked.iter().map(|c| c.to_citation()).collect();

    debug!(
        target: TARGET_CURATION,
        "Curated {} of {} members for cluster {} (press release: {}, opinion limited: {})",
        citations.len(),
        cluster.len(),
        cluster.cluster_key,
        summary.press_release_driven,
        summary.opinion_limited
    );

    (citations, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{Article, SourceIdentity};
    use crate::source::{SourceProfile, StaticSourceRegistry};
    use chrono::{Duration, TimeZone, Utc};

    fn registry() -> StaticSourceRegistry {
        let mut registry = StaticSourceRegistry::new();
        for (id, tier, role) in [
            ("wire", 1, StoryRole::Reporting),
            ("daily", 2, StoryRole::Reporting),
            ("gazette", 3, StoryRole::Reporting),
            ("times", 2, StoryRole::Reporting),
            ("dod", 1, StoryRole::Official),
            ("navy", 1, StoryRole::Official),
            ("think-tank", 1, StoryRole::Analysis),
            ("institute", 2, StoryRole::Analysis),
            ("blog", 3, StoryRole::Opinion),
            ("op-page", 2, StoryRole::Opinion),
        ] {
            registry.insert(id, SourceProfile::new(tier, role));
        }
        registry
    }

    fn article(id: &str, source: &str, title: &str, hours_ago: i64) -> Article {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Article::new(id, title, SourceIdentity::new(source, &source.to_uppercase()))
            .with_published_at(now - Duration::hours(hours_ago))
            .with_url(&format!("https://example.com/{}", id))
    }

    /// Cluster whose first article is the representative
    fn cluster(articles: Vec<Article>) -> StoryCluster {
        let members: Vec<ClusterMember> = articles
            .into_iter()
            .enumerate()
            .map(|(i, article)| ClusterMember {
                article,
                similarity: if i == 0 { 1.0 } else { 0.8 },
                is_representative: i == 0,
            })
            .collect();
        StoryCluster {
            cluster_key: "test-20250601".to_string(),
            representative: members[0].article.clone(),
            members,
            dominant_topic: None,
        }
    }

    #[test]
    fn test_clamp_max_citations() {
        assert_eq!(clamp_max_citations(0), 3);
        assert_eq!(clamp_max_citations(10), 10);
        assert_eq!(clamp_max_citations(40), 16);
        assert_eq!(CitationBudget::default().get(), 10);
        assert_eq!(CitationBudget::new(2).get(), 3);
    }

    #[test]
    fn test_official_announcement_is_cited() {
        let registry = registry();
        let cluster = cluster(vec![
            article("r1", "wire", "Navy picks Raytheon for interceptor work", 1),
            article("o1", "dod", "DoD awards missile defense contract", 2),
            article("r2", "daily", "Raytheon wins interceptor deal", 3),
        ]);

        let (citations, summary) = curate_citations(&cluster, CitationBudget::new(6), &registry);

        assert!(summary.press_release_driven);
        assert!(summary.has_official_source);
        assert!(citations.iter().any(|c| c.source_role == StoryRole::Official));
        assert_eq!(citations.len(), 3);
        assert_eq!(summary.role_counts.reporting, 2);
    }

    fn minority_official_cluster(lead_title: &str) -> StoryCluster {
        cluster(vec![
            article("r1", "wire", lead_title, 1),
            article("r2", "daily", "Interceptor deal goes to Raytheon", 2),
            article("r3", "times", "Raytheon gets interceptor work", 3),
            article("o1", "dod", "Statement on interceptor production", 4),
        ])
    }

    #[test]
    fn test_press_release_language_flags_minority_official_story() {
        let registry = registry();
        let cluster = minority_official_cluster("Navy awards Raytheon interceptor deal");

        let (citations, summary) = curate_citations(&cluster, CitationBudget::new(3), &registry);

        // One official member of four is under the share threshold
        assert!(summary.press_release_driven);
        assert!(citations.iter().any(|c| c.source_role == StoryRole::Official));
        assert_eq!(citations.len(), 3);
    }

    #[test]
    fn test_minority_official_story_without_markers() {
        let registry = registry();
        let cluster = minority_official_cluster("Navy picks Raytheon for interceptor work");

        let (citations, summary) = curate_citations(&cluster, CitationBudget::new(3), &registry);

        assert!(!summary.press_release_driven);
        // No official quota slot; the first two picks come from reporting
        assert_eq!(citations[0].source_role, StoryRole::Reporting);
        assert_eq!(citations[1].source_role, StoryRole::Reporting);
    }

    #[test]
    fn test_opinion_only_cluster_keeps_one() {
        let registry = registry();
        let cluster = cluster(vec![
            article("p1", "blog", "Why the contract is wrong", 1),
            article("p2", "blog", "The contract, revisited", 2),
            article("p3", "blog", "More on the contract", 3),
        ]);

        let (citations, summary) = curate_citations(&cluster, CitationBudget::new(6), &registry);

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].source_role, StoryRole::Opinion);
        assert!(summary.opinion_limited);
        assert_eq!(summary.role_counts.opinion, 1);
        assert_eq!(summary.source_diversity, 1);
    }

    #[test]
    fn test_sources_are_deduplicated_by_name() {
        let registry = registry();
        let mut same_outlet = article("r2", "gazette", "Second take", 2);
        same_outlet.source.name = "  wire ".to_string();
        let cluster = cluster(vec![
            article("r1", "wire", "First take", 1),
            same_outlet,
            article("r3", "daily", "Third take", 3),
        ]);

        let (citations, summary) = curate_citations(&cluster, CitationBudget::new(10), &registry);
        let ids: Vec<&str> = citations.iter().map(|c| c.article_id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r3"]);
        assert_eq!(summary.source_diversity, 2);
    }

    #[test]
    fn test_open_pool_respects_budget_and_opinion_reserve() {
        let registry = registry();
        let cluster = cluster(vec![
            article("r1", "wire", "Report one", 1),
            article("r2", "daily", "Report two", 1),
            article("r3", "gazette", "Report three", 1),
            article("r4", "times", "Report four", 1),
            article("a1", "think-tank", "Analysis one", 1),
            article("a2", "institute", "Analysis two", 1),
            article("p1", "blog", "Opinion one", 1),
            article("p2", "op-page", "Commentary two", 1),
        ]);

        let (citations, summary) = curate_citations(&cluster, CitationBudget::new(5), &registry);

        assert_eq!(citations.len(), 5);
        assert_eq!(summary.role_counts.opinion, 1);
        assert!(summary.opinion_limited);
        assert!(!summary.press_release_driven);
        // Quotas take r1, r2 (best reporting) and a1; the open pool then
        // prefers the tier-2 sources over the tier-3 gazette.
        let ids: Vec<&str> = citations.iter().map(|c| c.article_id.as_str()).collect();
        assert_eq!(&ids[..3], &["r1", "r2", "a1"]);
        assert!(!ids.contains(&"r3"));
        assert_eq!(citations[4].source_role, StoryRole::Opinion);
        assert_eq!(citations[4].article_id, "p2");
    }

    #[test]
    fn test_unregistered_sources_fall_back_to_ranking() {
        let registry = registry();
        let cluster = cluster(vec![
            article("u1", "unknown-a", "Story", 1),
            article("u2", "unknown-b", "Story", 2),
            article("u3", "unknown-a", "Story", 3),
        ]);

        let (citations, summary) = curate_citations(&cluster, CitationBudget::new(3), &registry);
        let ids: Vec<&str> = citations.iter().map(|c| c.article_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(citations.iter().all(|c| c.source_role == StoryRole::Unknown));
        assert_eq!(summary.role_counts, RoleCounts::default());
        assert_eq!(summary.source_diversity, 2);
        assert!(!summary.opinion_limited);
    }

    #[test]
    fn test_bounds_hold_for_large_clusters() {
        let registry = registry();
        let sources = ["wire", "daily", "gazette", "times", "dod", "navy", "think-tank", "institute", "blog", "op-page"];
        let articles: Vec<Article> = (0..40)
            .map(|i| {
                let source = sources[i % sources.len()];
                let title = if i % 7 == 0 { "Editorial: a view" } else { "Budget request details" };
                article(&format!("x{}", i), source, title, (i % 30) as i64)
            })
            .collect();
        let cluster = cluster(articles);

        for requested in [0, 3, 6, 10, 16, 30] {
            let budget = CitationBudget::new(requested);
            let (citations, summary) = curate_citations(&cluster, budget, &registry);

            assert!(citations.len() <= budget.get());
            assert!(
                citations
                    .iter()
                    .filter(|c| c.source_role == StoryRole::Opinion)
                    .count()
                    <= 1
            );
            let names: HashSet<String> = citations
                .iter()
                .map(|c| c.source_name.to_lowercase())
                .collect();
            assert_eq!(names.len(), citations.len());
            assert_eq!(summary.source_diversity, citations.len());
        }
    }

    #[test]
    fn test_empty_cluster_has_no_citations() {
        let registry = registry();
        let empty = StoryCluster {
            cluster_key: "story-undated".to_string(),
            representative: article("x", "wire", "", 0),
            members: Vec::new(),
            dominant_topic: None,
        };
        let (citations, summary) = curate_citations(&empty, CitationBudget::default(), &registry);
        assert!(citations.is_empty());
        assert_eq!(summary, CurationSummary::default());
    }
}
