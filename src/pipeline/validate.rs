// src/pipeline/validate.rs

//! Configuration validation.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load and validate the configuration file, reporting the settings in use.
pub fn run_validate(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate()?;

    log::info!("Configuration OK: {}", config_path.display());
    log::info!("  endpoint: {}", config.fetcher.endpoint);
    log::info!("  timeout: {}s", config.fetcher.timeout_secs);
    log::info!("  channel: {}", config.channel.title);
    log::info!("  history: {}", config.paths.history_csv);
    log::info!("  feed: {}", config.paths.feed_xml);

    Ok(())
}
