//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// RSS channel metadata
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Output artifact locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.endpoint.trim().is_empty() {
            return Err(AppError::validation("fetcher.endpoint is empty"));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.channel.title.trim().is_empty() {
            return Err(AppError::validation("channel.title is empty"));
        }
        if self.channel.link.trim().is_empty() {
            return Err(AppError::validation("channel.link is empty"));
        }
        if self.paths.history_csv.trim().is_empty() {
            return Err(AppError::validation("paths.history_csv is empty"));
        }
        if self.paths.feed_xml.trim().is_empty() {
            return Err(AppError::validation("paths.feed_xml is empty"));
        }
        if self.paths.response_json.trim().is_empty() {
            return Err(AppError::validation("paths.response_json is empty"));
        }
        Ok(())
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Promotions API endpoint
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// RSS channel metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel title
    #[serde(default = "defaults::channel_title")]
    pub title: String,

    /// Channel website link
    #[serde(default = "defaults::channel_link")]
    pub link: String,

    /// Channel description
    #[serde(default = "defaults::channel_description")]
    pub description: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: defaults::channel_title(),
            link: defaults::channel_link(),
            description: defaults::channel_description(),
        }
    }
}

/// Output artifact locations, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Saved raw API response (tracked in git for backfill)
    #[serde(default = "defaults::response_json")]
    pub response_json: String,

    /// Append-only key availability log
    #[serde(default = "defaults::history_csv")]
    pub history_csv: String,

    /// Rendered RSS feed
    #[serde(default = "defaults::feed_xml")]
    pub feed_xml: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            response_json: defaults::response_json(),
            history_csv: defaults::history_csv(),
            feed_xml: defaults::feed_xml(),
        }
    }
}

mod defaults {
    // Fetcher defaults
    pub fn endpoint() -> String {
        "https://www.amdgaming.com/promotions".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64; rv:145.0) Gecko/20100101 Firefox/145.0".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Channel defaults
    pub fn channel_title() -> String {
        "AMD Gaming Promotions".into()
    }
    pub fn channel_link() -> String {
        "https://www.amdgaming.com/promotions".into()
    }
    pub fn channel_description() -> String {
        "Free game giveaways and promotions from AMD Gaming".into()
    }

    // Path defaults
    pub fn response_json() -> String {
        "pages/data/amd_response.json".into()
    }
    pub fn history_csv() -> String {
        "pages/data/amd_gaming_keys_available.csv".into()
    }
    pub fn feed_xml() -> String {
        "pages/amd_gaming_promotions.rss".into()
    }
}
