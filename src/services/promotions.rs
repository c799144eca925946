// src/services/promotions.rs

//! Promotions API client.
//!
//! Fetches the current promotions payload from amdgaming.com. The endpoint
//! sits behind a Discourse install that rejects obvious bot traffic, so the
//! request carries a regular browser header profile.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::models::FetcherConfig;
use crate::storage;

/// Client for the promotions endpoint.
#[derive(Debug, Clone)]
pub struct PromotionsClient {
    endpoint: String,
    client: Client,
}

impl PromotionsClient {
    /// Create a configured client.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    /// Fetch the raw promotions payload.
    pub async fn fetch(&self) -> Result<Value> {
        log::info!("Fetching promotions from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", "en-US,en;q=0.7")
            .header("Referer", self.endpoint.as_str())
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        Ok(payload)
    }

    /// Save the raw payload for git history tracking.
    ///
    /// Pretty-printed with sorted keys so successive commits diff cleanly.
    pub async fn save_response(payload: &Value, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(payload)?;
        storage::write_atomic(path, &bytes).await?;
        log::info!("Saved API response to {}", path.display());
        Ok(())
    }
}
