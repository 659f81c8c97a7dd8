pub mod article;
pub mod clustering;
pub mod curation;
pub mod environment;
pub mod logging;
pub mod pipeline;
pub mod source;
pub mod vector;

pub const TARGET_PIPELINE: &str = "pipeline";

pub use article::{Article, SourceIdentity, Topic};
pub use clustering::{CongestionEvaluation, CongestionRules, StoryCluster};
pub use curation::{Citation, CurationSummary};
pub use environment::RunConfig;
pub use pipeline::{analyze_batch, run_batch, ClusterReport, RunReport};
pub use source::{SourceRegistry, StaticSourceRegistry, StoryRole};
pub use vector::{EmbeddingProvider, HttpEmbeddingProvider};
