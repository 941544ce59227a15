use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::fetch::{fetch_feed, Feed};
use crate::models::TrendRecord;
use crate::normalize::{normalize, RawItem};
use crate::score::{apply_platform_weight, compute_trending_score};
use crate::store::TrendStore;

/// Broadcast to downstream consumers after a cycle lands new data.
#[derive(Debug, Clone, Serialize)]
pub struct TrendsUpdated {
    pub timestamp: DateTime<Utc>,
    pub platforms: Vec<String>,
    pub full: bool,
}

/// Outcome of one ingestion cycle. Total fetch failure across all feeds is
/// reported here, never raised.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub platforms: Vec<String>,
    pub feeds_attempted: usize,
    pub feeds_failed: usize,
    pub items_saved: usize,
    pub items_skipped: usize,
    pub full: bool,
}

/// Drives ingestion: fan-out fetch over the configured feeds, then
/// normalize, score, and upsert each item. Invoked by an external
/// scheduler on two cadences: a frequent partial refresh over the fast
/// feeds and a periodic full pass over everything.
pub struct Orchestrator {
    store: Arc<dyn TrendStore>,
    client: Client,
    feeds: Vec<Feed>,
    updates: broadcast::Sender<TrendsUpdated>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn TrendStore>, feeds: Vec<Feed>) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            store,
            client: Client::new(),
            feeds,
            updates,
        }
    }

    /// Subscribe to post-cycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TrendsUpdated> {
        self.updates.subscribe()
    }

    /// Run one ingestion cycle. `full` touches every feed; the partial
    /// refresh touches only fast-flagged feeds. Every failure mode is
    /// local: a failed fetch becomes an empty batch, a bad item is skipped.
    pub async fn ingest_cycle(&self, full: bool) -> CycleReport {
        let cycle_start = std::time::Instant::now();
        let now = Utc::now();

        let selected: Vec<&Feed> = self
            .feeds
            .iter()
            .filter(|f| full || f.fast)
            .collect();
        info!(
            "Ingestion cycle started - mode={}, feeds={}",
            if full { "full" } else { "refresh" },
            selected.len()
        );

        let fetches = selected.iter().map(|feed| fetch_feed(&self.client, feed));
        let results = join_all(fetches).await;

        let mut feeds_failed = 0usize;
        let mut items_saved = 0usize;
        let mut items_skipped = 0usize;
        let mut platforms: Vec<String> = Vec::new();

        for (feed, result) in selected.iter().zip(results) {
            let items = match result {
                Ok(items) => items,
                Err(err) => {
                    warn!(
                        "Feed fetch failed, substituting empty batch - platform={}, error={:#}",
                        feed.platform, err
                    );
                    feeds_failed += 1;
                    Vec::new()
                }
            };

            let (saved, skipped) =
                self.save_batch(&items, &feed.platform, &feed.category, now);
            items_saved += saved;
            items_skipped += skipped;

            if !platforms.contains(&feed.platform) {
                platforms.push(feed.platform.clone());
            }
        }

        let report = CycleReport {
            timestamp: now,
            platforms: platforms.clone(),
            feeds_attempted: selected.len(),
            feeds_failed,
            items_saved,
            items_skipped,
            full,
        };

        // Receivers may come and go; a send with no listeners is fine.
        let _ = self.updates.send(TrendsUpdated {
            timestamp: now,
            platforms,
            full,
        });

        info!(
            "Ingestion cycle completed - duration={:.2}s, saved={}, skipped={}, feeds_failed={}/{}",
            cycle_start.elapsed().as_secs_f32(),
            report.items_saved,
            report.items_skipped,
            report.feeds_failed,
            report.feeds_attempted
        );
        report
    }

    /// Normalize, score, and upsert one fetched batch. Returns
    /// (saved, skipped); a malformed item never aborts the batch.
    pub fn save_batch(
        &self,
        items: &[RawItem],
        platform: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> (usize, usize) {
        if items.is_empty() {
            return (0, 0);
        }
        debug!(
            "Saving batch - platform={}, category={}, items={}",
            platform,
            category,
            items.len()
        );

        let mut saved = 0usize;
        let mut skipped = 0usize;

        for raw in items {
            match self.save_item(raw, platform, category, now) {
                Ok(()) => saved += 1,
                Err(err) => {
                    warn!(
                        "Skipping item - platform={}, title={:?}, error={:#}",
                        platform, raw.title, err
                    );
                    skipped += 1;
                }
            }
        }

        (saved, skipped)
    }

    fn save_item(
        &self,
        raw: &RawItem,
        platform: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let (metrics, item) = normalize(raw, platform, now)?;

        let previous = self.store.find_previous(&item.title, platform);
        let score = compute_trending_score(&metrics, previous.as_ref(), now);
        let trending_score = apply_platform_weight(score.trending, platform);

        self.store.upsert(TrendRecord {
            title: item.title,
            platform: platform.to_string(),
            category: category.to_string(),
            country: item.country,
            content: item.content,
            url: item.url,
            author: item.author,
            image_url: item.image_url,
            metrics,
            published_at: item.published_at,
            engagement_score: score.engagement,
            velocity_score: score.velocity,
            recency_score: score.recency,
            virality_score: score.virality,
            composite_score: score.trending,
            trending_score,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }
}
