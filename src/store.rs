use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::{CanonicalMetrics, TrendRecord};

/// Persistence boundary for trend records. Implementations serialize
/// upserts to the same (title, platform) key; last write wins.
pub trait TrendStore: Send + Sync {
    /// Most recent stored snapshot for the exact pair, or None if the pair
    /// has never been seen. None is distinct from a stored zero-metrics
    /// snapshot (they feed different velocity branches).
    fn find_previous(&self, title: &str, platform: &str) -> Option<CanonicalMetrics>;

    /// Insert-or-replace keyed by (title, platform).
    fn upsert(&self, record: TrendRecord);

    /// Point-in-time copy of every record first seen within the window.
    /// Callers cluster over this copy, so a concurrent ingestion cycle can
    /// never leak partial writes into an aggregation run.
    fn recent_window(&self, now: DateTime<Utc>, window: Duration) -> Vec<TrendRecord>;

    /// Records in one category within the window, by trending score
    /// descending, capped at `limit`.
    fn trending_by_category(
        &self,
        category: &str,
        now: DateTime<Utc>,
        window: Duration,
        limit: usize,
    ) -> Vec<TrendRecord>;
}

/// In-memory store. BTreeMap keeps window snapshots in a stable key order
/// so clustering (which is input-order sensitive) is reproducible across
/// runs.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<(String, String), TrendRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrendStore for MemoryStore {
    fn find_previous(&self, title: &str, platform: &str) -> Option<CanonicalMetrics> {
        let records = self.records.read().expect("store lock poisoned");
        records
            .get(&(title.to_string(), platform.to_string()))
            .map(|r| r.metrics.clone())
    }

    fn upsert(&self, record: TrendRecord) {
        let mut records = self.records.write().expect("store lock poisoned");
        let key = record.key();
        if let Some(existing) = records.get(&key) {
            // Replacement keeps the original first-seen time.
            let mut record = record;
            record.created_at = existing.created_at;
            records.insert(key, record);
        } else {
            records.insert(key, record);
        }
    }

    fn recent_window(&self, now: DateTime<Utc>, window: Duration) -> Vec<TrendRecord> {
        let cutoff = now - window;
        let records = self.records.read().expect("store lock poisoned");
        let out: Vec<TrendRecord> = records
            .values()
            .filter(|r| r.created_at >= cutoff)
            .cloned()
            .collect();
        debug!(
            "Window snapshot - total={}, in_window={}",
            records.len(),
            out.len()
        );
        out
    }

    fn trending_by_category(
        &self,
        category: &str,
        now: DateTime<Utc>,
        window: Duration,
        limit: usize,
    ) -> Vec<TrendRecord> {
        let window_records = self.recent_window(now, window);
        crate::merge::trending_by_category(&window_records, category, limit)
    }
}
