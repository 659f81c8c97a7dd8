use anyhow::Result;
use clap::Parser;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use storyline::clustering::{
    score_breakdown, title_tokens, ArticleFeatures, DEFAULT_SIMILARITY_THRESHOLD,
};
use storyline::vector::{embedding_text, HttpEmbeddingProvider, DEFAULT_EMBEDDING_MODEL};
use storyline::{Article, EmbeddingProvider, SourceIdentity, Topic};

/// Explains why two headlines would or would not land in the same story.
///
/// Usage:
///    cargo run --bin score_pair -- "Navy awards \$2B missile contract" \
///        "Navy awards missile contract worth \$2 billion" -a navy,missile-defense -b navy
///
/// Output format:
/// ```text
/// Lexical similarity: 0.667 (4 shared of 6 tokens)
/// Topic similarity:   0.500
/// Embedding cosine:   n/a
/// Combined score:     0.617 (threshold is 0.720)
///
/// RESULT: NO MATCH (0.617 < 0.720)
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First headline
    first: String,

    /// Second headline
    second: String,

    /// Comma-separated topic slugs for the first headline
    #[arg(short = 'a', long, value_delimiter = ',')]
    topics_a: Vec<String>,

    /// Comma-separated topic slugs for the second headline
    #[arg(short = 'b', long, value_delimiter = ',')]
    topics_b: Vec<String>,

    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    threshold: f64,

    /// Embedding service base URL; vectors are skipped when unset
    #[arg(long, env = "EMBEDDING_URL")]
    embedding_url: Option<String>,

    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,
}

fn to_article(id: &str, title: &str, topics: &[String]) -> Article {
    Article::new(id, title, SourceIdentity::new("cli", "cli")).with_topics(
        topics
            .iter()
            .filter(|slug| !slug.trim().is_empty())
            .map(|slug| Topic::new(slug.trim(), slug.trim()))
            .collect(),
    )
}

async fn embed(provider: &dyn EmbeddingProvider, article: &Article) -> Option<Vec<f32>> {
    match provider.embed(&embedding_text(article)).await {
        Ok(vector) => vector,
        Err(e) => {
            warn!("Embedding failed for {:?}: {}", article.title, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let a = to_article("a", &args.first, &args.topics_a);
    let b = to_article("b", &args.second, &args.topics_b);

    let (vector_a, vector_b) = match args.embedding_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            let provider = HttpEmbeddingProvider::new(url, &args.embedding_model)?;
            (embed(&provider, &a).await, embed(&provider, &b).await)
        }
        _ => (None, None),
    };

    let features_a = ArticleFeatures::new(&a, vector_a.as_deref());
    let features_b = ArticleFeatures::new(&b, vector_b.as_deref());
    let breakdown = score_breakdown(&features_a, &features_b);

    let shared = features_a.tokens.intersection(&features_b.tokens).count();
    let total = features_a.tokens.union(&features_b.tokens).count();

    println!(
        "Lexical similarity: {:.3} ({} shared of {} tokens)",
        breakdown.lexical, shared, total
    );
    println!("Topic similarity:   {:.3}", breakdown.topic);
    match breakdown.embedding {
        Some(cosine) => println!("Embedding cosine:   {:.3}", cosine),
        None => println!("Embedding cosine:   n/a"),
    }
    println!(
        "Combined score:     {:.3} (threshold is {:.3})",
        breakdown.combined, args.threshold
    );
    println!();

    if breakdown.combined >= args.threshold {
        println!(
            "RESULT: MATCH ({:.3} >= {:.3})",
            breakdown.combined, args.threshold
        );
    } else {
        println!(
            "RESULT: NO MATCH ({:.3} < {:.3})",
            breakdown.combined, args.threshold
        );
        let unmatched: Vec<String> = title_tokens(&args.first)
            .symmetric_difference(&title_tokens(&args.second))
            .cloned()
            .collect();
        if !unmatched.is_empty() {
            println!("Unshared tokens: {}", unmatched.join(", "));
        }
    }

    Ok(())
}
