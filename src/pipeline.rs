use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::article::Article;
use crate::clustering::{build_clusters, evaluate_congestion, CongestionEvaluation, StoryCluster};
use crate::curation::{curate_citations, Citation, CurationSummary};
use crate::environment::RunConfig;
use crate::source::SourceRegistry;
use crate::vector::{fetch_embeddings, EmbeddingProvider, EmbeddingTable};
use crate::TARGET_PIPELINE;

/// Everything the digest generator needs for one story
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReport {
    pub cluster: StoryCluster,
    pub congestion: CongestionEvaluation,
    pub citations: Vec<Citation>,
    pub curation: CurationSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub articles: usize,
    pub embedded: usize,
    pub pairs_compared: usize,
    pub clusters: usize,
    pub singletons: usize,
    pub congested: usize,
}

/// Output of one run over a batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub stats: RunStats,
    pub clusters: Vec<ClusterReport>,
}

impl RunReport {
    pub fn empty(now: DateTime<Utc>) -> Self {
        RunReport {
            generated_at: now,
            stats: RunStats::default(),
            clusters: Vec::new(),
        }
    }
}

/// Keeps the first article for each id so clusters partition distinct ids
pub fn dedupe_articles(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::with_capacity(articles.len());
    articles
        .into_iter()
        .filter(|article| {
            let fresh = seen.insert(article.id.clone());
            if !fresh {
                warn!(target: TARGET_PIPELINE, "Dropping duplicate article id {}", article.id);
            }
            fresh
        })
        .collect()
}

/// Clusters a batch whose embeddings are already fetched, then evaluates
/// congestion and curates citations for every cluster.
pub fn analyze_batch(
    articles: &[Article],
    embeddings: &EmbeddingTable,
    config: &RunConfig,
    registry: &dyn SourceRegistry,
    now: DateTime<Utc>,
) -> RunReport {
    if articles.is_empty() {
        return RunReport::empty(now);
    }

    let (clusters, cluster_stats) =
        build_clusters(articles, embeddings, &config.cluster_config(), registry);
    let budget = config.citation_budget();

    let reports: Vec<ClusterReport> = clusters
        .into_iter()
        .filter(|cluster| !cluster.is_empty())
        .map(|cluster| {
            let congestion = evaluate_congestion(&cluster, now, &config.congestion);
            let (citations, curation) = curate_citations(&cluster, budget, registry);
            ClusterReport {
                cluster,
                congestion,
                citations,
                curation,
            }
        })
        .collect();

    let stats = RunStats {
        articles: articles.len(),
        embedded: articles
            .iter()
            .filter(|a| embeddings.contains_key(&a.id))
            .count(),
        pairs_compared: cluster_stats.pairs_compared,
        clusters: reports.len(),
        singletons: cluster_stats.singletons,
        congested: reports.iter().filter(|r| r.congestion.is_congested).count(),
    };

    RunReport {
        generated_at: now,
        stats,
        clusters: reports,
    }
}

/// Runs the whole pipeline over one batch.
///
/// The embedding phase runs to completion first (when a provider is given);
/// the pairwise pass after it never performs I/O.
///
/// # Arguments
/// * `articles` - The batch, in any order
/// * `config` - Run settings
/// * `registry` - Source role and quality lookup
/// * `provider` - Optional embedding backend
/// * `now` - Reference time for congestion windows
///
/// # Returns
/// * `RunReport` - Clusters with congestion and citations
pub async fn run_batch(
    articles: Vec<Article>,
    config: &RunConfig,
    registry: &dyn SourceRegistry,
    provider: Option<&dyn EmbeddingProvider>,
    now: DateTime<Utc>,
) -> RunReport {
    let articles = dedupe_articles(articles);
    if articles.is_empty() {
        info!(target: TARGET_PIPELINE, "Empty batch, nothing to cluster");
        return RunReport::empty(now);
    }

    let embeddings = match provider {
        Some(provider) => {
            fetch_embeddings(
                &articles,
                provider,
                config.max_embedding_articles,
                config.embedding_concurrency,
            )
            .await
        }
        None => EmbeddingTable::new(),
    };

    let report = analyze_batch(&articles, &embeddings, config, registry, now);

    info!(
        target: TARGET_PIPELINE,
        "Run complete: {} articles, {} embedded, {} clusters, {} congested",
        report.stats.articles,
        report.stats.embedded,
        report.stats.clusters,
        report.stats.congested
    );

    report
}
