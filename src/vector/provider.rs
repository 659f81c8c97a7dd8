use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use tracing::debug;

use super::TARGET_VECTOR;

/// Default per-request timeout for the HTTP provider
pub const EMBEDDING_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Turns text into an embedding vector.
///
/// `Ok(None)` means the provider has no vector for this text. Errors are
/// treated the same way by the caller, they only differ in how they are
/// logged.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// Embedding provider speaking the Ollama `/api/embeddings` protocol
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl HttpEmbeddingProvider {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        Self::with_timeout(base_url, model, EMBEDDING_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build embedding HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .with_context(|| format!("Embedding request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "Embedding endpoint {} returned {}",
                self.endpoint,
                status
            ));
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .context("Malformed embedding response")?;

        debug!(
            target: TARGET_VECTOR,
            "Embedding response with {} dimensions",
            payload.embedding.as_ref().map_or(0, |v| v.len())
        );

        Ok(payload.embedding.filter(|v| !v.is_empty()))
    }
}
