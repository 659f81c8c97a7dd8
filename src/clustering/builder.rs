use std::collections::HashMap;
use tokio::time::Instant;
use tracing::{debug, info};

use super::representative::{derive_cluster_key, dominant_topic, select_representative};
use super::similarity::{score_features, ArticleFeatures};
use super::types::{ClusterMember, StoryCluster};
use super::union_find::UnionFind;
use super::{DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_WINDOW_HOURS, TARGET_CLUSTER};
use crate::article::Article;
use crate::source::SourceRegistry;
use crate::vector::EmbeddingTable;

/// Parameters of the pairwise pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterConfig {
    pub similarity_threshold: f64,
    pub window_hours: i64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }
}

/// Counters from one clustering pass, logged and reported with the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
    pub articles: usize,
    pub pairs_compared: usize,
    pub unions: usize,
    pub clusters: usize,
    pub singletons: usize,
}

/// Groups a batch of articles into story clusters.
///
/// This function:
/// 1. Orders articles by effective timestamp, newest first (ties by id)
/// 2. Scores every pair whose timestamps are within the window
/// 3. Unions pairs scoring at or above the threshold
/// 4. Turns each connected component into a `StoryCluster`
///
/// # Arguments
/// * `articles` - The batch; ids are expected to be distinct
/// * `embeddings` - Vectors fetched before the pass, keyed by article id
/// * `config` - Threshold and window
/// * `registry` - Source role lookup for representative selection
///
/// # Returns
/// * `(Vec<StoryCluster>, ClusterStats)` - Clusters partitioning the batch
pub fn build_clusters(
    articles: &[Article],
    embeddings: &EmbeddingTable,
    config: &ClusterConfig,
    registry: &dyn SourceRegistry,
) -> (Vec<StoryCluster>, ClusterStats) {
    let mut stats = ClusterStats {
        articles: articles.len(),
        ..ClusterStats::default()
    };
    if articles.is_empty() {
        return (Vec::new(), stats);
    }

    let start_time = Instant::now();

    // Step 1: deterministic processing order
    let mut order: Vec<&Article> = articles.iter().collect();
    order.sort_by(|a, b| {
        b.effective_millis()
            .cmp(&a.effective_millis())
            .then_with(|| a.id.cmp(&b.id))
    });

    let millis: Vec<i64> = order.iter().map(|a| a.effective_millis()).collect();
    let features: Vec<ArticleFeatures> = order
        .iter()
        .map(|a| ArticleFeatures::new(a, embeddings.get(&a.id).map(Vec::as_slice)))
        .collect();

    // Step 2 and 3: pairwise pass inside the window
    let window_ms = config.window_hours.max(0).saturating_mul(3_600_000);
    let mut sets = UnionFind::new(order.len());
    for i in 0..order.len() {
        for j in (i + 1)..order.len() {
            // Sorted newest first, so every later partner is further away
            if millis[i].saturating_sub(millis[j]) > window_ms {
                break;
            }
            stats.pairs_compared += 1;

            let similarity = score_features(&features[i], &features[j]);
            if similarity >= config.similarity_threshold && sets.union(i, j) {
                stats.unions += 1;
                debug!(
                    target: TARGET_CLUSTER,
                    "Joined {} and {} (similarity {:.3})",
                    order[i].id, order[j].id, similarity
                );
            }
        }
    }

    // Step 4: group by root, in processing order
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_by_root: HashMap<usize, usize> = HashMap::new();
    for position in 0..order.len() {
        let root = sets.find(position);
        let group = *group_by_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(position);
    }

    let mut clusters: Vec<StoryCluster> = groups
        .iter()
        .filter_map(|positions| assemble_cluster(positions, &order, &features, registry))
        .collect();

    clusters.sort_by(|a, b| {
        b.representative
            .effective_millis()
            .cmp(&a.representative.effective_millis())
            .then_with(|| a.cluster_key.cmp(&b.cluster_key))
            .then_with(|| a.representative.id.cmp(&b.representative.id))
    });

    stats.clusters = clusters.len();
    stats.singletons = clusters.iter().filter(|c| c.len() == 1).count();

    info!(
        target: TARGET_CLUSTER,
        "Clustered {} articles into {} clusters ({} singletons): {} pairs compared, {} unions in {:?}",
        stats.articles,
        stats.clusters,
        stats.singletons,
        stats.pairs_compared,
        stats.unions,
        start_time.elapsed()
    );

    (clusters, stats)
}

/// Builds one cluster from positions into the processing order.
/// Returns `None` for an empty component, which is never emitted.
fn assemble_cluster(
    positions: &[usize],
    order: &[&Article],
    features: &[ArticleFeatures],
    registry: &dyn SourceRegistry,
) -> Option<StoryCluster> {
    let member_articles: Vec<&Article> = positions.iter().map(|&p| order[p]).collect();
    let representative_index = select_representative(&member_articles, registry)?;
    let representative_position = positions[representative_index];
    let representative_features = &features[representative_position];

    let mut members: Vec<ClusterMember> = positions
        .iter()
        .map(|&position| {
            let is_representative = position == representative_position;
            let similarity = if is_representative {
                1.0
            } else {
                score_features(representative_features, &features[position])
            };
            ClusterMember {
                article: order[position].clone(),
                similarity,
                is_representative,
            }
        })
        .collect();

    members.sort_by(|a, b| {
        b.is_representative
            .cmp(&a.is_representative)
            .then_with(|| b.similarity.total_cmp(&a.similarity))
            .then_with(|| {
                b.article
                    .effective_millis()
                    .cmp(&a.article.effective_millis())
            })
            .then_with(|| a.article.id.cmp(&b.article.id))
    });

    let representative = order[representative_position].clone();
    Some(StoryCluster {
        cluster_key: derive_cluster_key(&representative),
        dominant_topic: dominant_topic(member_articles.iter().copied()),
        representative,
        members,
    })
}
