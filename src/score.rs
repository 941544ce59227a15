use chrono::{DateTime, Utc};

use crate::models::{CanonicalMetrics, CompositeScore};

/// Composite weights: engagement 40%, velocity 30%, recency 20%, virality 10%.
const W_ENGAGEMENT: f64 = 0.4;
const W_VELOCITY: f64 = 0.3;
const W_RECENCY: f64 = 0.2;
const W_VIRALITY: f64 = 0.1;

/// Calibration constant: ~15% weighted engagement rate saturates the scale.
const ENGAGEMENT_SCALE: f64 = 6.67;

/// Recency decay rate; half-life ~12 hours.
const RECENCY_DECAY: f64 = 0.0578;

/// Neutral velocity when no prior snapshot exists.
const VELOCITY_NO_HISTORY: f64 = 50.0;

/// Per-platform view counts considered "viral".
const VIRAL_THRESHOLDS: &[(&str, f64)] = &[
    ("twitter", 100_000.0),
    ("instagram", 500_000.0),
    ("tiktok", 1_000_000.0),
    ("youtube", 1_000_000.0),
    ("reddit", 50_000.0),
    ("news", 10_000.0),
    ("facebook", 200_000.0),
    ("linkedin", 50_000.0),
    ("snapchat", 300_000.0),
];
const DEFAULT_VIRAL_THRESHOLD: f64 = 100_000.0;

/// Signal-strength multipliers applied after the composite is computed.
const PLATFORM_WEIGHTS: &[(&str, f64)] = &[
    ("twitter", 1.2),
    ("tiktok", 1.15),
    ("youtube", 1.1),
    ("instagram", 1.0),
    ("reddit", 1.05),
    ("news", 0.9),
    ("facebook", 0.95),
    ("linkedin", 0.85),
    ("snapchat", 0.9),
];

fn clamp_score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

fn lookup(table: &[(&str, f64)], platform: &str, default: f64) -> f64 {
    let platform = platform.to_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == platform)
        .map_or(default, |(_, v)| *v)
}

/// Weighted interaction rate relative to reach: comments and shares count
/// more than likes. Zero views means zero engagement, not a division error.
pub fn engagement_score(metrics: &CanonicalMetrics) -> f64 {
    if metrics.views == 0 {
        return 0.0;
    }
    let weighted =
        (metrics.likes + 2 * metrics.comments + 3 * metrics.shares) as f64;
    let rate = weighted / metrics.views as f64 * 100.0;
    clamp_score(rate * ENGAGEMENT_SCALE)
}

/// Growth of engagement totals against the immediately-prior snapshot of the
/// same item. No history is a defined state (neutral 50), distinct from a
/// zero-metrics previous snapshot (newly viral, 100).
pub fn velocity_score(
    current: &CanonicalMetrics,
    previous: Option<&CanonicalMetrics>,
) -> f64 {
    let Some(previous) = previous else {
        return VELOCITY_NO_HISTORY;
    };

    let current_total = (current.views + current.likes + current.comments) as f64;
    let previous_total =
        (previous.views + previous.likes + previous.comments) as f64;

    if previous_total == 0.0 {
        return 100.0;
    }

    let growth_rate = (current_total - previous_total) / previous_total * 100.0;
    clamp_score(growth_rate * 2.0)
}

/// Exponential decay from publish time, half-life ~12h. A publish time in
/// the future clamps to 100 rather than overshooting.
pub fn recency_score(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - published_at).num_milliseconds() as f64 / 3_600_000.0;
    clamp_score(100.0 * (-RECENCY_DECAY * age_hours).exp())
}

/// Log-scale view count relative to the platform's viral threshold.
/// Unknown platforms fall back to the 100K default.
pub fn virality_score(metrics: &CanonicalMetrics) -> f64 {
    let threshold = lookup(
        VIRAL_THRESHOLDS,
        &metrics.platform,
        DEFAULT_VIRAL_THRESHOLD,
    );
    let ratio = metrics.views as f64 / threshold;
    clamp_score((ratio + 1.0).log10() * 50.0)
}

/// Compute all four sub-scores and the composite trending score for one
/// item. Pure function of its inputs; `now` is explicit so callers and
/// tests agree on the clock. The composite is rounded to 2 decimal places;
/// the platform weight is NOT applied here (see `apply_platform_weight`).
pub fn compute_trending_score(
    current: &CanonicalMetrics,
    previous: Option<&CanonicalMetrics>,
    now: DateTime<Utc>,
) -> CompositeScore {
    let engagement = engagement_score(current);
    let velocity = velocity_score(current, previous);
    let recency = recency_score(current.published_at, now);
    let virality = virality_score(current);

    let trending = engagement * W_ENGAGEMENT
        + velocity * W_VELOCITY
        + recency * W_RECENCY
        + virality * W_VIRALITY;

    CompositeScore {
        engagement,
        velocity,
        recency,
        virality,
        trending: (trending * 100.0).round() / 100.0,
    }
}

/// Multiply a composite score by the platform's signal-strength weight.
/// Applied after composite rounding, before persistence; the result is not
/// re-rounded.
pub fn apply_platform_weight(score: f64, platform: &str) -> f64 {
    score * lookup(PLATFORM_WEIGHTS, platform, 1.0)
}
