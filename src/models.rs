use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical engagement snapshot for one item on one platform.
/// Constructed fresh per scoring call; carries no identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub published_at: DateTime<Utc>,
    pub platform: String,
}

/// The four sub-scores plus the unweighted composite, all in [0, 100].
/// `trending` is rounded to 2 decimal places; the platform weight is
/// applied separately so the raw composite stays comparable across
/// platforms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompositeScore {
    pub engagement: f64,
    pub velocity: f64,
    pub recency: f64,
    pub virality: f64,
    pub trending: f64,
}

/// Persisted trend record, upsert-keyed by (title, platform).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRecord {
    pub title: String,
    pub platform: String,
    pub category: String,
    pub country: String,
    #[serde(default)]
    pub content: String,
    pub url: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub metrics: CanonicalMetrics,
    pub published_at: DateTime<Utc>,

    pub engagement_score: f64,
    pub velocity_score: f64,
    pub recency_score: f64,
    pub virality_score: f64,
    /// Unweighted composite, kept for cross-platform aggregation math.
    pub composite_score: f64,
    /// Platform-weight-adjusted score; never edited by hand.
    pub trending_score: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrendRecord {
    pub fn key(&self) -> (String, String) {
        (self.title.clone(), self.platform.clone())
    }
}

/// Element-wise metric sums across one cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

/// One contributing record inside a global trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSource {
    pub platform: String,
    pub url: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingType {
    Viral,
    Massive,
    Hot,
    Rising,
    Trending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Exploding,
    Surging,
    Growing,
    Stable,
}

/// Merged representation of one story cluster across platforms.
/// Recomputed wholesale on every aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalTrend {
    pub id: String,
    pub title: String,
    pub category: String,
    pub country: String,
    pub url: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,

    pub platforms: Vec<String>,
    pub platform_count: usize,
    pub aggregated_metrics: AggregatedMetrics,
    pub avg_trending_score: f64,
    pub cross_platform_bonus: f64,
    pub global_score: f64,
    pub trending_type: TrendingType,
    pub momentum: Momentum,
    pub sources: Vec<TrendSource>,
}
