//! Promotion data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One promotion's state at a point in time.
///
/// The five required fields form the history row; the optional fields are
/// narrative metadata carried by the upstream payload and used by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionSnapshot {
    /// Stable upstream identifier, unique within one snapshot
    pub promotion_id: String,

    /// Display title, mutable over time
    pub title: String,

    /// URL-friendly identifier, stable per promotion_id
    pub slug: String,

    /// Number of game keys remaining
    pub keys_available: u64,

    /// Lifecycle label (active, expired, ...); open string set upstream
    pub status: String,

    /// HTML/markdown blurb describing the promotion
    pub content: Option<String>,

    /// Official game store page URL
    pub game_website_url: Option<String>,

    /// Gaming platform (Steam, Epic, ...)
    pub platform: Option<String>,

    /// Game developer/publisher name
    pub developer: Option<String>,

    /// Promotion thumbnail image URL
    pub thumbnail_image_url: Option<String>,

    /// Optional promotional video URL
    pub youtube_url: Option<String>,

    /// Comma-separated genre tags
    pub tags: Option<String>,

    /// Creation time reported by the upstream API
    pub created_at: Option<DateTime<Utc>>,

    /// Whether the promotion is featured/highlighted
    pub featured: bool,
}

impl PromotionSnapshot {
    /// Build the history row for this snapshot at the given observation time.
    pub fn to_record(&self, observed_at: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord {
            timestamp: observed_at,
            promotion_id: self.promotion_id.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            keys_available: self.keys_available,
            status: self.status.clone(),
        }
    }
}

/// One persisted observation in the history store.
///
/// Rows are append-only: never rewritten, never deleted. Column order matches
/// the CSV artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Observation time (UTC, serialized as ISO-8601 text)
    pub timestamp: DateTime<Utc>,

    /// Promotion identifier
    pub promotion_id: String,

    /// Display title at observation time
    pub title: String,

    /// URL-friendly identifier
    pub slug: String,

    /// Keys remaining at observation time
    pub keys_available: u64,

    /// Status at observation time
    pub status: String,
}

impl HistoryRecord {
    /// Deduplication key for backfill merges.
    pub fn key(&self) -> (DateTime<Utc>, String) {
        (self.timestamp, self.promotion_id.clone())
    }
}

/// One archived snapshot capture, reconstructed from a past point in time.
///
/// Consumed only by the backfill path of the history store. How the sequence
/// of captures is obtained is the producer's concern.
#[derive(Debug, Clone)]
pub struct ArchiveCapture {
    /// When the snapshot was captured
    pub captured_at: DateTime<Utc>,

    /// The full promotion set at that point
    pub snapshots: Vec<PromotionSnapshot>,
}
