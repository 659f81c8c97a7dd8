use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::provider::EmbeddingProvider;
use super::similarity::is_usable_vector;
use super::TARGET_VECTOR;
use crate::article::Article;

/// Article id to embedding vector, complete before any scoring starts
pub type EmbeddingTable = HashMap<String, Vec<f32>>;

/// Text submitted to the provider for one article
pub fn embedding_text(article: &Article) -> String {
    match (article.title.trim(), article.summary.trim()) {
        ("", summary) => summary.to_string(),
        (title, "") => title.to_string(),
        (title, summary) => format!("{}\n\n{}", title, summary),
    }
}

/// Picks the `limit` most recent articles by effective timestamp, ties by id
pub fn select_for_embedding(articles: &[Article], limit: usize) -> Vec<&Article> {
    let mut ordered: Vec<&Article> = articles.iter().collect();
    ordered.sort_by(|a, b| {
        b.effective_millis()
            .cmp(&a.effective_millis())
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered.truncate(limit);
    ordered
}

/// Fetches embeddings for the most recent articles of a batch.
///
/// Each lookup is independent: a failed, empty, or malformed response only
/// leaves that article out of the table. Nothing is retried here.
///
/// # Arguments
/// * `articles` - The batch being clustered
/// * `provider` - Embedding backend
/// * `max_articles` - Cap on how many articles are submitted
/// * `concurrency` - Maximum in-flight requests
///
/// # Returns
/// * `EmbeddingTable` - Vectors keyed by article id
pub async fn fetch_embeddings(
    articles: &[Article],
    provider: &dyn EmbeddingProvider,
    max_articles: usize,
    concurrency: usize,
) -> EmbeddingTable {
    let selected = select_for_embedding(articles, max_articles);
    if selected.is_empty() {
        return EmbeddingTable::new();
    }

    let start_time = Instant::now();
    let requested = selected.len();

    let results: Vec<_> = stream::iter(selected.into_iter().map(|article| async move {
        let text = embedding_text(article);
        (article.id.clone(), provider.embed(&text).await)
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;

    let mut table = EmbeddingTable::with_capacity(results.len());
    let mut failed = 0;
    for (article_id, result) in results {
        match result {
            Ok(Some(vector)) if is_usable_vector(&vector) => {
                table.insert(article_id, vector);
            }
            Ok(Some(vector)) => {
                warn!(target: TARGET_VECTOR, "Discarding malformed embedding for article {} ({} dimensions)", article_id, vector.len());
                failed += 1;
            }
            Ok(None) => {
                debug!(target: TARGET_VECTOR, "No embedding available for article {}", article_id);
            }
            Err(e) => {
                warn!(target: TARGET_VECTOR, "Embedding lookup failed for article {}: {:#}", article_id, e);
                failed += 1;
            }
        }
    }

    info!(
        target: TARGET_VECTOR,
        "Embedding phase: requested={}, received={}, failed={}, elapsed={:?}",
        requested,
        table.len(),
        failed,
        start_time.elapsed()
    );

    table
}
