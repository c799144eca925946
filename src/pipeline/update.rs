// src/pipeline/update.rs

//! Live update pipeline: fetch → parse → history append → feed build.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::feed::FeedBuilder;
use crate::history::CsvHistory;
use crate::models::{Config, PromotionSnapshot};
use crate::services::PromotionsClient;
use crate::snapshot;
use crate::storage;

/// Fetch the current snapshot, append it to history, and rebuild the feed.
///
/// The raw payload is saved before parsing so the git archive keeps
/// accumulating capture points even when validation fails. `now` stamps the
/// history rows and the feed build date.
pub async fn run_update(config: &Config, now: DateTime<Utc>) -> Result<()> {
    let client = PromotionsClient::new(&config.fetcher)?;
    let payload = client.fetch().await?;

    PromotionsClient::save_response(&payload, Path::new(&config.paths.response_json)).await?;

    let snapshots = snapshot::parse_payload(&payload)?;
    log::info!("Processing {} promotions", snapshots.len());

    let history = CsvHistory::new(&config.paths.history_csv);
    history.append_current(&snapshots, now)?;

    write_feed(config, &snapshots, now).await?;

    log::info!("Update complete");
    Ok(())
}

/// Append history rows from the previously saved response.
pub async fn run_log(config: &Config, now: DateTime<Utc>) -> Result<usize> {
    let snapshots = load_saved_snapshots(config).await?;

    let history = CsvHistory::new(&config.paths.history_csv);
    let written = history.append_current(&snapshots, now)?;
    Ok(written)
}

/// Rebuild the feed from the previously saved response.
pub async fn run_feed(config: &Config, now: DateTime<Utc>) -> Result<()> {
    let snapshots = load_saved_snapshots(config).await?;
    write_feed(config, &snapshots, now).await
}

/// Parse the saved raw response into snapshots.
async fn load_saved_snapshots(config: &Config) -> Result<Vec<PromotionSnapshot>> {
    let path = Path::new(&config.paths.response_json);
    let text = storage::read_to_string_optional(path)
        .await?
        .ok_or_else(|| {
            AppError::config(format!(
                "No saved response at {}. Run 'update' first.",
                path.display()
            ))
        })?;
    snapshot::parse_str(&text)
}

/// Build the feed document and write it atomically.
async fn write_feed(config: &Config, snapshots: &[PromotionSnapshot], now: DateTime<Utc>) -> Result<()> {
    let builder = FeedBuilder::new(config.channel.clone());
    let channel = builder.build(snapshots, now)?;
    let xml = FeedBuilder::to_xml(&channel);

    let path = Path::new(&config.paths.feed_xml);
    storage::write_atomic(path, xml.as_bytes()).await?;

    log::info!("Feed with {} items written to {}", snapshots.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rss::Channel;
    use std::str::FromStr;
    use tempfile::TempDir;

    const RESPONSE: &str = r#"{ "items": [
        { "id": "p1", "title": "Game A", "slug": "game-a", "keysAvailable": 42, "status": "active" },
        { "id": "p2", "title": "Game B", "slug": "game-b", "keysAvailable": 5, "status": "active" }
    ] }"#;

    fn test_config(tmp: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.response_json = tmp
            .path()
            .join("amd_response.json")
            .to_string_lossy()
            .into_owned();
        config.paths.history_csv = tmp
            .path()
            .join("keys_available.csv")
            .to_string_lossy()
            .into_owned();
        config.paths.feed_xml = tmp
            .path()
            .join("promotions.rss")
            .to_string_lossy()
            .into_owned();
        config
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_run_log_appends_rows() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        std::fs::write(&config.paths.response_json, RESPONSE).unwrap();

        let written = run_log(&config, now()).await.unwrap();
        assert_eq!(written, 2);

        let records = CsvHistory::new(&config.paths.history_csv).read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].promotion_id, "p1");
        assert_eq!(records[0].timestamp, now());
    }

    #[tokio::test]
    async fn test_run_feed_writes_parseable_document() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        std::fs::write(&config.paths.response_json, RESPONSE).unwrap();

        run_feed(&config, now()).await.unwrap();

        let xml = std::fs::read_to_string(&config.paths.feed_xml).unwrap();
        assert!(xml.starts_with("<?xml"));

        let channel = Channel::from_str(&xml).unwrap();
        assert_eq!(channel.items().len(), 2);
        assert_eq!(channel.items()[0].title(), Some("Game A"));
    }

    #[tokio::test]
    async fn test_run_log_without_saved_response_fails() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);

        let err = run_log(&config, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_malformed_entry_aborts_without_partial_rows() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        // Second entry is missing keysAvailable
        std::fs::write(
            &config.paths.response_json,
            r#"{ "items": [
                { "id": "p1", "title": "A", "slug": "a", "keysAvailable": 1, "status": "active" },
                { "id": "p2", "title": "B", "slug": "b", "status": "active" }
            ] }"#,
        )
        .unwrap();

        let err = run_log(&config, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(CsvHistory::new(&config.paths.history_csv)
            .read_all()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_empty_items_yields_empty_feed_and_no_rows() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        std::fs::write(&config.paths.response_json, r#"{ "items": [] }"#).unwrap();

        assert_eq!(run_log(&config, now()).await.unwrap(), 0);
        run_feed(&config, now()).await.unwrap();

        let xml = std::fs::read_to_string(&config.paths.feed_xml).unwrap();
        let channel = Channel::from_str(&xml).unwrap();
        assert_eq!(channel.items().len(), 0);
        assert!(CsvHistory::new(&config.paths.history_csv)
            .read_all()
            .unwrap()
            .is_empty());
    }
}
