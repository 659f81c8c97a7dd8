use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::article::Article;
use crate::vector::cosine_similarity;

// Weights when both sides carry an embedding
const EMBEDDING_WEIGHT: f64 = 0.45;
const LEXICAL_WEIGHT_WITH_EMBEDDING: f64 = 0.35;
const TOPIC_WEIGHT_WITH_EMBEDDING: f64 = 0.20;

// Weights for title and topics alone
const LEXICAL_WEIGHT: f64 = 0.7;
const TOPIC_WEIGHT: f64 = 0.3;

/// Tokens shorter than this are ignored
const MIN_TOKEN_LENGTH: usize = 3;

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex =
        Regex::new(r"[^\p{Alphabetic}\p{Nd}\s]").expect("token pattern is valid");
}

/// Lowercased title words with punctuation removed, longer than two chars
pub fn title_tokens(title: &str) -> HashSet<String> {
    let lowered = title.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "")
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_LENGTH)
        .map(str::to_string)
        .collect()
}

pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Per-article inputs to scoring, computed once before the pairwise loop
#[derive(Debug, Clone, Default)]
pub struct ArticleFeatures<'a> {
    pub tokens: HashSet<String>,
    pub topics: HashSet<String>,
    pub embedding: Option<&'a [f32]>,
}

impl<'a> ArticleFeatures<'a> {
    pub fn new(article: &Article, embedding: Option<&'a [f32]>) -> Self {
        ArticleFeatures {
            tokens: title_tokens(&article.title),
            topics: article.topics.iter().map(|t| t.slug.clone()).collect(),
            embedding,
        }
    }
}

/// Individual signals behind a pairwise score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityBreakdown {
    pub lexical: f64,
    pub topic: f64,
    pub embedding: Option<f64>,
    pub combined: f64,
}

/// Scores two articles from precomputed features.
///
/// Uses `0.45*embedding + 0.35*lexical + 0.20*topic` when both sides have a
/// vector, otherwise `0.7*lexical + 0.3*topic`. The result is in [0, 1].
pub fn score_breakdown(a: &ArticleFeatures, b: &ArticleFeatures) -> SimilarityBreakdown {
    let lexical = jaccard(&a.tokens, &b.tokens);
    let topic = jaccard(&a.topics, &b.topics);
    let embedding = match (a.embedding, b.embedding) {
        (Some(va), Some(vb)) => Some(cosine_similarity(va, vb)),
        _ => None,
    };

    let combined = match embedding {
        Some(cosine) => {
            EMBEDDING_WEIGHT * cosine
                + LEXICAL_WEIGHT_WITH_EMBEDDING * lexical
                + TOPIC_WEIGHT_WITH_EMBEDDING * topic
        }
        None => LEXICAL_WEIGHT * lexical + TOPIC_WEIGHT * topic,
    };

    SimilarityBreakdown {
        lexical,
        topic,
        embedding,
        combined: combined.clamp(0.0, 1.0),
    }
}

pub fn score_features(a: &ArticleFeatures, b: &ArticleFeatures) -> f64 {
    score_breakdown(a, b).combined
}

/// Convenience scorer for two articles and their optional vectors
pub fn score(
    a: &Article,
    b: &Article,
    embedding_a: Option<&[f32]>,
    embedding_b: Option<&[f32]>,
) -> f64 {
    score_features(
        &ArticleFeatures::new(a, embedding_a),
        &ArticleFeatures::new(b, embedding_b),
    )
}
