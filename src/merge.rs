use chrono::{DateTime, Utc};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::cluster::cluster_records;
use crate::models::{
    AggregatedMetrics, GlobalTrend, Momentum, TrendRecord, TrendSource, TrendingType,
};
use crate::score::recency_score;

/// Global trending queries return at most this many merged trends.
pub const GLOBAL_TOP_N: usize = 50;

/// Category queries return at most this many records.
pub const CATEGORY_LIMIT: usize = 20;

/// Collapse one cluster into a single global trend; None for an empty
/// cluster (the clusterer never emits one, but callers stay panic-free).
///
/// The highest-scoring member (first maximum in input order) becomes the
/// primary and lends the trend its title and metadata; metrics are summed
/// across all members and the blended score gets a logarithmic bonus for
/// cross-platform presence.
pub fn merge_cluster(members: &[&TrendRecord], now: DateTime<Utc>) -> Option<GlobalTrend> {
    let (first, rest) = members.split_first()?;

    let mut primary = *first;
    for m in rest {
        if m.trending_score > primary.trending_score {
            primary = m;
        }
    }

    let mut aggregated = AggregatedMetrics::default();
    let mut platforms: Vec<String> = Vec::new();
    let mut score_sum = 0.0;
    for m in members {
        aggregated.views += m.metrics.views;
        aggregated.likes += m.metrics.likes;
        aggregated.comments += m.metrics.comments;
        aggregated.shares += m.metrics.shares;
        score_sum += m.trending_score;
        if !platforms.contains(&m.platform) {
            platforms.push(m.platform.clone());
        }
    }

    let platform_count = platforms.len();
    let avg_trending_score = score_sum / members.len() as f64;
    let cross_platform_bonus = ((platform_count + 1) as f64).log10() * 15.0;
    let global_score = avg_trending_score + cross_platform_bonus;

    let trending_type =
        classify_trending_type(global_score, platform_count, &aggregated);
    let momentum = classify_momentum(primary.published_at, global_score, now);

    let sources = members
        .iter()
        .map(|m| TrendSource {
            platform: m.platform.clone(),
            url: m.url.clone(),
            score: m.trending_score,
        })
        .collect();

    let id_seed = format!("{}|{}", primary.title, platforms.join(","));

    Some(GlobalTrend {
        id: format!("{:016x}", xxh3_64(id_seed.as_bytes())),
        title: primary.title.clone(),
        category: primary.category.clone(),
        country: primary.country.clone(),
        url: primary.url.clone(),
        author: primary.author.clone(),
        image_url: primary.image_url.clone(),
        published_at: primary.published_at,
        platforms,
        platform_count,
        aggregated_metrics: aggregated,
        avg_trending_score,
        cross_platform_bonus,
        global_score,
        trending_type,
        momentum,
        sources,
    })
}

/// Rule chain evaluated in order, first match wins.
fn classify_trending_type(
    global_score: f64,
    platform_count: usize,
    aggregated: &AggregatedMetrics,
) -> TrendingType {
    if platform_count >= 4 && global_score >= 80.0 {
        TrendingType::Viral
    } else if aggregated.views >= 5_000_000 {
        TrendingType::Massive
    } else if global_score >= 70.0 {
        TrendingType::Hot
    } else if platform_count >= 3 {
        TrendingType::Rising
    } else {
        TrendingType::Trending
    }
}

/// Momentum combines the primary's recency with the blended score.
fn classify_momentum(
    published_at: DateTime<Utc>,
    global_score: f64,
    now: DateTime<Utc>,
) -> Momentum {
    let recency = recency_score(published_at, now);

    if recency >= 90.0 && global_score >= 75.0 {
        Momentum::Exploding
    } else if recency >= 70.0 && global_score >= 60.0 {
        Momentum::Surging
    } else if recency >= 50.0 {
        Momentum::Growing
    } else {
        Momentum::Stable
    }
}

/// Cluster the working set, merge every cluster, and return the top global
/// trends ordered by blended score.
pub fn global_trending(
    records: &[TrendRecord],
    now: DateTime<Utc>,
    top_n: usize,
) -> Vec<GlobalTrend> {
    let clusters = cluster_records(records);
    debug!(
        "Merging clusters - records={}, clusters={}",
        records.len(),
        clusters.len()
    );

    let mut trends: Vec<GlobalTrend> = clusters
        .iter()
        .filter_map(|cluster| {
            let members: Vec<&TrendRecord> =
                cluster.iter().map(|&idx| &records[idx]).collect();
            merge_cluster(&members, now)
        })
        .collect();

    trends.sort_by(|a, b| {
        b.global_score
            .partial_cmp(&a.global_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    trends.truncate(top_n);
    trends
}

/// Records in one category ordered by trending score, capped at `limit`.
pub fn trending_by_category(
    records: &[TrendRecord],
    category: &str,
    limit: usize,
) -> Vec<TrendRecord> {
    let mut out: Vec<TrendRecord> = records
        .iter()
        .filter(|r| r.category == category)
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        b.trending_score
            .partial_cmp(&a.trending_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out.truncate(limit);
    out
}
