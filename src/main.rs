use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use prettytable::{Cell, Row, Table};
use std::path::PathBuf;
use tracing::info;

use storyline::article::{load_articles, parse_timestamp};
use storyline::logging::configure_logging;
use storyline::vector::{HttpEmbeddingProvider, DEFAULT_EMBEDDING_MODEL};
use storyline::{run_batch, EmbeddingProvider, RunConfig, RunReport, StaticSourceRegistry};
use storyline::TARGET_PIPELINE;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Cluster a batch of articles into stories", long_about = None)]
struct Cli {
    /// JSON file holding an array of articles
    #[arg(required = true)]
    input: PathBuf,

    /// JSON file mapping source ids to quality tier and role
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Base URL of the embedding service (omit to cluster without vectors)
    #[arg(long, env = "EMBEDDING_URL")]
    embedding_url: Option<String>,

    /// Embedding model name
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Reference time for congestion windows (defaults to now)
    #[arg(long)]
    now: Option<String>,

    /// Override the pairwise similarity threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Override the clustering time window in hours
    #[arg(short, long)]
    window_hours: Option<i64>,

    /// Override the citation limit per cluster
    #[arg(short, long)]
    max_citations: Option<usize>,

    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let mut config = RunConfig::from_env();
    if let Some(threshold) = cli.threshold {
        config.similarity_threshold = threshold;
    }
    if let Some(hours) = cli.window_hours {
        config.window_hours = hours;
    }
    if let Some(max) = cli.max_citations {
        config.max_citations = max;
    }

    let now: DateTime<Utc> = match cli.now.as_deref() {
        Some(raw) => parse_timestamp(raw).with_context(|| format!("Invalid --now value {:?}", raw))?,
        None => Utc::now(),
    };

    let registry = match &cli.registry {
        Some(path) => StaticSourceRegistry::from_json_file(path)?,
        None => StaticSourceRegistry::new(),
    };
    let articles = load_articles(&cli.input)?;
    info!(
        target: TARGET_PIPELINE,
        "Loaded {} articles and {} registered sources",
        articles.len(),
        registry.len()
    );

    let provider = match cli.embedding_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            Some(HttpEmbeddingProvider::new(url, &cli.embedding_model)?)
        }
        _ => None,
    };

    let report = run_batch(
        articles,
        &config,
        &registry,
        provider.as_ref().map(|p| p as &dyn EmbeddingProvider),
        now,
    )
    .await;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&report),
    }

    Ok(())
}

/// One row per cluster, newest story first
fn print_table(report: &RunReport) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Cluster Key"),
        Cell::new("Articles"),
        Cell::new("Sources"),
        Cell::new("Congestion"),
        Cell::new("Citations"),
        Cell::new("Topic"),
        Cell::new("Representative"),
    ]));

    for entry in &report.clusters {
        let congestion = if entry.congestion.is_congested {
            format!("{:.3} *", entry.congestion.congestion_score)
        } else {
            format!("{:.3}", entry.congestion.congestion_score)
        };

        table.add_row(Row::new(vec![
            Cell::new(&entry.cluster.cluster_key),
            Cell::new(&entry.cluster.len().to_string()),
            Cell::new(&entry.congestion.unique_sources.to_string()),
            Cell::new(&congestion),
            Cell::new(&entry.citations.len().to_string()),
            Cell::new(entry.cluster.dominant_topic.as_deref().unwrap_or("-")),
            Cell::new(&entry.cluster.representative.title),
        ]));
    }

    table.printstd();
    println!(
        "{} articles, {} embedded, {} clusters ({} singletons), {} congested",
        report.stats.articles,
        report.stats.embedded,
        report.stats.clusters,
        report.stats.singletons,
        report.stats.congested
    );
}
