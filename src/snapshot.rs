// src/snapshot.rs

//! Snapshot parsing and validation.
//!
//! Turns one raw promotions payload into a normalized, order-preserving list
//! of [`PromotionSnapshot`] values. Malformed entries are rejected with a
//! validation error naming the entry, never coerced or dropped.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::PromotionSnapshot;

/// Raw promotion entry as the upstream API ships it.
///
/// Unknown fields (maxKeysPerIp, consumerId, ...) are ignored; the required
/// fields fail deserialization when missing or mistyped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPromotion {
    id: String,
    title: String,
    slug: String,
    keys_available: u64,
    status: String,

    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    game_website_url: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    developer: Option<String>,
    #[serde(default)]
    thumbnail_image_url: Option<String>,
    #[serde(default)]
    youtube_url: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    /// Unix seconds
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    featured: bool,
}

impl RawPromotion {
    fn into_snapshot(self) -> Result<PromotionSnapshot> {
        let created_at: Option<DateTime<Utc>> = match self.created_at {
            Some(ts) => Some(DateTime::from_timestamp(ts, 0).ok_or_else(|| {
                AppError::validation(format!(
                    "promotion '{}': createdAt {} out of range",
                    self.id, ts
                ))
            })?),
            None => None,
        };

        Ok(PromotionSnapshot {
            promotion_id: self.id,
            title: self.title,
            slug: self.slug,
            keys_available: self.keys_available,
            status: self.status,
            content: self.content,
            game_website_url: self.game_website_url,
            platform: self.platform,
            developer: self.developer,
            thumbnail_image_url: self.thumbnail_image_url,
            youtube_url: self.youtube_url,
            tags: self.tags,
            created_at,
            featured: self.featured,
        })
    }
}

/// Parse a raw promotions payload into snapshots, preserving source order.
///
/// The payload must be an object with an `items` list. An empty list is
/// valid and yields an empty vector.
pub fn parse_payload(payload: &Value) -> Result<Vec<PromotionSnapshot>> {
    let items = payload
        .get("items")
        .ok_or_else(|| AppError::validation("payload has no 'items' field"))?
        .as_array()
        .ok_or_else(|| AppError::validation("payload 'items' is not a list"))?;

    let mut snapshots = Vec::with_capacity(items.len());
    let mut seen_ids: HashSet<String> = HashSet::with_capacity(items.len());

    for (index, entry) in items.iter().enumerate() {
        let raw: RawPromotion = serde_json::from_value(entry.clone())
            .map_err(|e| AppError::validation(format!("entry {index}: {e}")))?;

        if !seen_ids.insert(raw.id.clone()) {
            return Err(AppError::validation(format!(
                "entry {index}: duplicate promotion id '{}'",
                raw.id
            )));
        }

        snapshots.push(raw.into_snapshot()?);
    }

    Ok(snapshots)
}

/// Parse a raw JSON string into snapshots.
pub fn parse_str(text: &str) -> Result<Vec<PromotionSnapshot>> {
    let payload: Value = serde_json::from_str(text)?;
    parse_payload(&payload)
}
