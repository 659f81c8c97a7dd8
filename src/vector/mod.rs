// Embedding lookup and vector similarity
pub const TARGET_VECTOR: &str = "article-embeddings";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

pub mod embedding;
pub mod provider;
pub mod similarity;

// Re-export main components
pub use embedding::*;
pub use provider::*;
pub use similarity::*;
