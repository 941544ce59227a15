use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CanonicalMetrics;

/// Canonical shape every source adapter must emit. Mapping platform-specific
/// field names (tweet_volume, num_comments, upvotes, ...) into this shape is
/// the adapter's job; the engine never sees source-specific fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Non-metric record fields extracted alongside the canonical metrics.
#[derive(Debug, Clone)]
pub struct NormalizedItem {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub country: String,
    pub published_at: DateTime<Utc>,
}

/// Turn one adapter item into a canonical metrics record plus the metadata
/// that travels with it. A blank title is a per-item error; the batch
/// continues without it. Missing publish times default to ingestion time.
pub fn normalize(raw: &RawItem, platform: &str, now: DateTime<Utc>) -> Result<(CanonicalMetrics, NormalizedItem)> {
    let title = raw.title.trim().to_string();
    if title.is_empty() {
        bail!("item has no usable title");
    }

    let published_at = raw.published_at.unwrap_or(now);

    let metrics = CanonicalMetrics {
        views: raw.views,
        likes: raw.likes,
        comments: raw.comments,
        shares: raw.shares,
        published_at,
        platform: platform.to_string(),
    };

    let item = NormalizedItem {
        title,
        content: raw.description.trim().to_string(),
        url: raw.url.clone(),
        author: raw.author.clone(),
        image_url: raw.image_url.clone(),
        country: raw
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("global")
            .to_string(),
        published_at,
    };

    Ok((metrics, item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let raw = RawItem { title: "   ".to_string(), ..Default::default() };
        assert!(normalize(&raw, "twitter", Utc::now()).is_err());
    }

    #[test]
    fn missing_publish_time_defaults_to_now() {
        let now = Utc::now();
        let raw = RawItem { title: "Story".to_string(), ..Default::default() };
        let (metrics, item) = normalize(&raw, "twitter", now).unwrap();
        assert_eq!(metrics.published_at, now);
        assert_eq!(item.published_at, now);
    }

    #[test]
    fn fields_map_through_and_title_is_trimmed() {
        let now = Utc::now();
        let raw = RawItem {
            title: "  Big Story  ".to_string(),
            description: "details".to_string(),
            url: Some("https://example.com/a".to_string()),
            views: 1000,
            likes: 50,
            comments: 10,
            shares: 3,
            country: Some("us".to_string()),
            ..Default::default()
        };
        let (metrics, item) = normalize(&raw, "reddit", now).unwrap();
        assert_eq!(item.title, "Big Story");
        assert_eq!(metrics.views, 1000);
        assert_eq!(metrics.platform, "reddit");
        assert_eq!(item.country, "us");
    }

    #[test]
    fn empty_country_falls_back_to_global() {
        let now = Utc::now();
        let raw = RawItem { title: "Story".to_string(), country: Some("  ".to_string()), ..Default::default() };
        let (_, item) = normalize(&raw, "news", now).unwrap();
        assert_eq!(item.country, "global");
    }

    #[test]
    fn raw_item_deserializes_with_defaults() {
        let raw: RawItem = serde_json::from_str(r#"{"title": "Just a title"}"#).unwrap();
        assert_eq!(raw.title, "Just a title");
        assert_eq!(raw.views, 0);
        assert!(raw.published_at.is_none());
    }
}
