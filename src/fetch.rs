use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::normalize::RawItem;

/// One feed entry from the manifest: an external adapter endpoint that
/// serves already-canonicalized items for a single platform and category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub platform: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub url: String,
    /// Fast feeds are also polled by the frequent partial refresh cycle.
    #[serde(default)]
    pub fast: bool,
}

fn default_category() -> String {
    "general".to_string()
}

/// Fetch one feed's batch of raw items. A 404 means the feed has nothing
/// for this cycle and yields an empty batch.
pub async fn fetch_feed(client: &Client, feed: &Feed) -> Result<Vec<RawItem>> {
    let start = std::time::Instant::now();

    debug!("Fetching feed - platform={}, url={}", feed.platform, feed.url);

    let resp = client
        .get(&feed.url)
        .send()
        .await
        .with_context(|| format!("Request failed for {}", feed.url))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        warn!("Feed not found (404) - platform={}, url={}", feed.platform, feed.url);
        return Ok(Vec::new());
    }

    let resp = resp
        .error_for_status()
        .with_context(|| format!("HTTP error for {}", feed.url))?;

    let items: Vec<RawItem> = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {}", feed.url))?;

    let elapsed = start.elapsed();
    info!(
        "Feed fetch completed - platform={}, duration={:.2}s, items={}",
        feed.platform,
        elapsed.as_secs_f32(),
        items.len()
    );

    Ok(items)
}
