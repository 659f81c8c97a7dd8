// Module declarations
pub mod builder;
pub mod congestion;
pub mod representative;
pub mod similarity;
pub mod types;
pub mod union_find;

pub use types::*;

pub use builder::{build_clusters, ClusterConfig, ClusterStats};
pub use congestion::{evaluate_congestion, CongestionEvaluation, CongestionRules};
pub use representative::{derive_cluster_key, dominant_topic, select_representative};
pub use similarity::{
    jaccard, score, score_breakdown, title_tokens, ArticleFeatures, SimilarityBreakdown,
};
pub use union_find::UnionFind;

pub const TARGET_CLUSTER: &str = "clustering";

/// Minimum pairwise similarity for two articles to join the same story
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.72;

/// Pairs further apart than this are never compared
pub const DEFAULT_WINDOW_HOURS: i64 = 48;
