// src/feed.rs

//! RSS 2.0 feed generation for current promotion state.
//!
//! Each snapshot maps to exactly one feed item. Interpolated text is
//! XML-escaped before it is embedded in the HTML description; only the
//! builder-constructed tags (thumbnail, paragraphs, trailer link) pass
//! through unescaped. The `rss` writer escapes element text again at the
//! document level, so titles containing `<`, `>` or `&` survive a
//! parse round-trip unchanged.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use rss::{CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ChannelConfig, PromotionSnapshot};

/// Builder for the promotions RSS channel.
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    channel: ChannelConfig,
}

impl FeedBuilder {
    /// Create a feed builder with the given channel metadata.
    pub fn new(channel: ChannelConfig) -> Self {
        Self { channel }
    }

    /// Build the channel for the given snapshots.
    ///
    /// Zero snapshots yield a well-formed channel with zero items.
    pub fn build(
        &self,
        snapshots: &[PromotionSnapshot],
        build_date: DateTime<Utc>,
    ) -> Result<Channel> {
        let items: Vec<Item> = snapshots
            .iter()
            .map(|s| self.build_item(s, build_date))
            .collect::<Result<_>>()?;

        Ok(ChannelBuilder::default()
            .title(self.channel.title.clone())
            .link(self.channel.link.clone())
            .description(self.channel.description.clone())
            .last_build_date(build_date.to_rfc2822())
            .items(items)
            .build())
    }

    /// Render a channel as a self-contained XML document.
    pub fn to_xml(channel: &Channel) -> String {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{channel}")
    }

    fn build_item(&self, snapshot: &PromotionSnapshot, build_date: DateTime<Utc>) -> Result<Item> {
        // Guid is the stable upstream id, never a permalink; readers use it
        // for change detection across runs.
        let guid = GuidBuilder::default()
            .value(snapshot.promotion_id.clone())
            .permalink(false)
            .build();

        let pub_date = snapshot.created_at.unwrap_or(build_date).to_rfc2822();

        let categories = snapshot
            .tags
            .iter()
            .map(|tags| CategoryBuilder::default().name(tags.clone()).build())
            .collect::<Vec<_>>();

        Ok(ItemBuilder::default()
            .title(snapshot.title.clone())
            .link(self.item_link(snapshot)?)
            .guid(guid)
            .description(build_description(snapshot))
            .pub_date(pub_date)
            .categories(categories)
            .build())
    }

    /// Direct link from the payload, or the channel link joined with the slug.
    fn item_link(&self, snapshot: &PromotionSnapshot) -> Result<String> {
        if let Some(link) = &snapshot.game_website_url {
            return Ok(link.clone());
        }

        let mut url = Url::parse(&self.channel.link)?;
        url.path_segments_mut()
            .map_err(|_| AppError::config("channel.link cannot be a base URL"))?
            .pop_if_empty()
            .push(&snapshot.slug);
        Ok(url.to_string())
    }
}

/// Build the HTML description for one promotion.
///
/// All interpolated text is escaped; the surrounding tags are constructed
/// here and are the only markup that reaches the reader unescaped.
pub fn build_description(snapshot: &PromotionSnapshot) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(thumbnail) = &snapshot.thumbnail_image_url {
        parts.push(format!(
            "<img src=\"{}\" alt=\"{}\"/><br/>",
            escape(thumbnail),
            escape(&snapshot.title)
        ));
    }

    if let Some(content) = &snapshot.content {
        parts.push(format!("<p>{}</p>", escape(content)));
    }

    if let Some(platform) = &snapshot.platform {
        parts.push(format!("<p><strong>Platform:</strong> {}</p>", escape(platform)));
    }

    if let Some(developer) = &snapshot.developer {
        parts.push(format!(
            "<p><strong>Developer:</strong> {}</p>",
            escape(developer)
        ));
    }

    parts.push(format!(
        "<p><strong>{} keys available</strong></p>",
        snapshot.keys_available
    ));

    if let Some(youtube) = &snapshot.youtube_url {
        parts.push(format!(
            "<p><a href=\"{}\">Watch Trailer</a></p>",
            escape(youtube)
        ));
    }

    parts.concat()
}
