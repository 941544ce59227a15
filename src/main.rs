mod cluster;
mod fetch;
mod merge;
mod models;
mod normalize;
mod orchestrator;
mod score;
mod similarity;
mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use tracing::{debug, info};

use crate::fetch::Feed;
use crate::merge::{global_trending, CATEGORY_LIMIT, GLOBAL_TOP_N};
use crate::orchestrator::Orchestrator;
use crate::store::{MemoryStore, TrendStore};

/// trendwave - cross-platform trend scoring and aggregation engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the feeds manifest (JSON array of adapter endpoints)
    #[arg(short, long, default_value = "feeds.json")]
    feeds: String,

    /// Output directory for generated files
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Recent window for clustering and top-N queries, in hours
    #[arg(long, default_value_t = 24)]
    window_hours: i64,

    /// Maximum number of global trends to emit
    #[arg(long, default_value_t = GLOBAL_TOP_N)]
    top_n: usize,

    /// Additionally emit the top records for this category
    #[arg(long)]
    category: Option<String>,

    /// Run the partial refresh cycle (fast feeds only) instead of a full
    /// ingestion pass
    #[arg(long)]
    refresh: bool,
}

fn load_feeds(path: &str) -> Result<Vec<Feed>> {
    if !std::path::Path::new(path).exists() {
        return Err(anyhow::anyhow!(
            "feeds manifest not found at {path}\n\
             Use --feeds to point at a JSON array of feed entries, e.g.:\n\
             [{{\"platform\": \"twitter\", \"category\": \"general\", \"url\": \"https://adapter.local/twitter.json\", \"fast\": true}}]\n",
        ));
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading feeds manifest {path}"))?;
    let feeds: Vec<Feed> = serde_json::from_str(&text)
        .with_context(|| format!("Parsing feeds manifest {path}"))?;
    Ok(feeds)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting trendwave");

    let args = Args::parse();
    let feeds = load_feeds(&args.feeds)?;
    info!(
        "Feeds manifest loaded - feeds={}, fast={}",
        feeds.len(),
        feeds.iter().filter(|f| f.fast).count()
    );

    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(store.clone(), feeds);
    let mut updates = orchestrator.subscribe();

    let report = orchestrator.ingest_cycle(!args.refresh).await;
    if let Ok(note) = updates.try_recv() {
        debug!(
            "Update notification - platforms={:?}, full={}",
            note.platforms, note.full
        );
    }

    // Aggregate over a point-in-time snapshot of the recent window.
    let now = Utc::now();
    let window = Duration::hours(args.window_hours);
    let mut records = store.recent_window(now, window);
    records.sort_by(|a, b| {
        b.trending_score
            .partial_cmp(&a.trending_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let trends = global_trending(&records, now, args.top_n);
    info!(
        "Aggregation completed - window_records={}, global_trends={}",
        records.len(),
        trends.len()
    );

    // Persist to a date-scoped directory.
    let date_dir =
        std::path::Path::new(&args.output_dir).join(now.format("%Y-%m-%d").to_string());
    std::fs::create_dir_all(&date_dir)
        .with_context(|| format!("Creating output directory {}", date_dir.display()))?;

    std::fs::write(
        date_dir.join("trends.json"),
        serde_json::to_vec_pretty(&records)?,
    )?;
    debug!("Wrote trends.json");

    std::fs::write(
        date_dir.join("global_trends.json"),
        serde_json::to_vec_pretty(&trends)?,
    )?;
    debug!("Wrote global_trends.json");

    std::fs::write(
        date_dir.join("cycle_report.json"),
        serde_json::to_vec_pretty(&report)?,
    )?;
    debug!("Wrote cycle_report.json");

    if let Some(category) = &args.category {
        let top = store.trending_by_category(category, now, window, CATEGORY_LIMIT);
        info!(
            "Category query - category={}, stored={}, returned={}",
            category,
            store.len(),
            top.len()
        );
        std::fs::write(
            date_dir.join("category_trends.json"),
            serde_json::to_vec_pretty(&top)?,
        )?;
        debug!("Wrote category_trends.json");
    }

    info!(
        "Run completed - mode={}, saved={}, skipped={}, feeds_failed={}/{}, output={}",
        if report.full { "full" } else { "refresh" },
        report.items_saved,
        report.items_skipped,
        report.feeds_failed,
        report.feeds_attempted,
        date_dir.display()
    );
    Ok(())
}
