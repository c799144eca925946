// src/history.rs

//! Append-only CSV history of key availability observations.
//!
//! The store is an ordered sequence of [`HistoryRecord`] rows across all
//! runs. Rows are never rewritten or deleted; ordering is resolved at read
//! time by a stable sort on the observation timestamp.
//!
//! Two write paths with deliberately different semantics:
//! - [`CsvHistory::append_current`] stamps every snapshot with the given
//!   observation time and appends unconditionally. Repeated runs produce
//!   repeated rows even when values are unchanged.
//! - [`CsvHistory::backfill`] merges archived captures and skips any
//!   `(timestamp, promotion_id)` pair already present, so re-running it
//!   against an evolving archive never duplicates rows.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ArchiveCapture, HistoryRecord, PromotionSnapshot};

/// CSV-backed history store.
#[derive(Debug, Clone)]
pub struct CsvHistory {
    path: PathBuf,
}

impl CsvHistory {
    /// Create a store backed by the given CSV file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per snapshot, stamped with `observed_at`.
    ///
    /// Returns the number of rows written. Zero snapshots leave the file
    /// untouched.
    pub fn append_current(
        &self,
        snapshots: &[PromotionSnapshot],
        observed_at: DateTime<Utc>,
    ) -> Result<usize> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let records: Vec<HistoryRecord> =
            snapshots.iter().map(|s| s.to_record(observed_at)).collect();

        self.append_records(&records)?;
        log::info!(
            "Appended {} rows to {} at {}",
            records.len(),
            self.path.display(),
            observed_at
        );
        Ok(records.len())
    }

    /// Merge archived captures into the store, skipping rows already present.
    ///
    /// A row is identified by its `(timestamp, promotion_id)` pair; one row
    /// is kept per distinct timestamp even when the observed values are
    /// identical. New rows are appended in timestamp order. Returns the
    /// number of rows written.
    pub fn backfill(&self, captures: &[ArchiveCapture]) -> Result<usize> {
        let mut existing = self.existing_keys()?;
        let mut new_records: Vec<HistoryRecord> = Vec::new();

        for capture in captures {
            for snapshot in &capture.snapshots {
                let record = snapshot.to_record(capture.captured_at);
                if existing.insert(record.key()) {
                    new_records.push(record);
                }
            }
        }

        if new_records.is_empty() {
            log::info!("Backfill: no new rows for {}", self.path.display());
            return Ok(0);
        }

        new_records.sort_by_key(|r| r.timestamp);
        self.append_records(&new_records)?;
        log::info!(
            "Backfill: appended {} rows to {}",
            new_records.len(),
            self.path.display()
        );
        Ok(new_records.len())
    }

    /// Read every row, stable-sorted by timestamp.
    ///
    /// A missing file is an empty store, not an error.
    pub fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records: Vec<HistoryRecord> = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }

        // Stable: ties keep original insertion order
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    /// Collect the `(timestamp, promotion_id)` pairs already in the store.
    fn existing_keys(&self) -> Result<HashSet<(DateTime<Utc>, String)>> {
        let records = self.read_all()?;
        Ok(records.iter().map(HistoryRecord::key).collect())
    }

    /// Append records, writing the header row only when the file is new.
    fn append_records(&self, records: &[HistoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let exists = self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!exists)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn snapshot(id: &str, title: &str, keys: u64) -> PromotionSnapshot {
        PromotionSnapshot {
            promotion_id: id.to_string(),
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            keys_available: keys,
            status: "active".to_string(),
            content: None,
            game_website_url: None,
            platform: None,
            developer: None,
            thumbnail_image_url: None,
            youtube_url: None,
            tags: None,
            created_at: None,
            featured: false,
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn store(tmp: &TempDir) -> CsvHistory {
        CsvHistory::new(tmp.path().join("keys.csv"))
    }

    #[test]
    fn test_append_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        let snapshots = vec![snapshot("p1", "Game A", 42), snapshot("p2", "Game B", 7)];
        let written = history.append_current(&snapshots, at(1)).unwrap();
        assert_eq!(written, 2);

        let records = history.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].promotion_id, "p1");
        assert_eq!(records[0].title, "Game A");
        assert_eq!(records[0].keys_available, 42);
        assert_eq!(records[0].timestamp, at(1));
        assert_eq!(records[1].promotion_id, "p2");
    }

    #[test]
    fn test_live_append_does_not_dedupe() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);
        let snapshots = vec![snapshot("p1", "Game A", 42)];

        history.append_current(&snapshots, at(1)).unwrap();
        history.append_current(&snapshots, at(1)).unwrap();

        assert_eq!(history.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_snapshot_set_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        assert_eq!(history.append_current(&[], at(1)).unwrap(), 0);
        assert!(!history.path().exists());
        assert!(history.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_timestamp_order_across_runs() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        history
            .append_current(&[snapshot("p1", "Game A", 42)], at(1))
            .unwrap();
        history
            .append_current(&[snapshot("p1", "Game A", 10)], at(2))
            .unwrap();

        let records = history.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].keys_available, 42);
        assert_eq!(records[1].keys_available, 10);
        assert!(records[0].timestamp < records[1].timestamp);
    }

    #[test]
    fn test_backfill_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        let captures = vec![
            ArchiveCapture {
                captured_at: at(1),
                snapshots: vec![snapshot("p1", "Game A", 42)],
            },
            ArchiveCapture {
                captured_at: at(2),
                snapshots: vec![snapshot("p1", "Game A", 10), snapshot("p2", "Game B", 5)],
            },
        ];

        assert_eq!(history.backfill(&captures).unwrap(), 3);
        assert_eq!(history.backfill(&captures).unwrap(), 0);

        let records = history.read_all().unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_backfill_skips_rows_from_live_appends() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        history
            .append_current(&[snapshot("p1", "Game A", 42)], at(1))
            .unwrap();

        let captures = vec![ArchiveCapture {
            captured_at: at(1),
            snapshots: vec![snapshot("p1", "Game A", 42), snapshot("p2", "Game B", 5)],
        }];

        // Only the p2 row is new for that timestamp
        assert_eq!(history.backfill(&captures).unwrap(), 1);
        assert_eq!(history.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_backfill_keeps_identical_values_at_distinct_timestamps() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        let captures = vec![
            ArchiveCapture {
                captured_at: at(1),
                snapshots: vec![snapshot("p1", "Game A", 42)],
            },
            ArchiveCapture {
                captured_at: at(2),
                snapshots: vec![snapshot("p1", "Game A", 42)],
            },
        ];

        assert_eq!(history.backfill(&captures).unwrap(), 2);
    }

    #[test]
    fn test_backfill_appends_in_timestamp_order() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        let captures = vec![
            ArchiveCapture {
                captured_at: at(3),
                snapshots: vec![snapshot("p1", "Game A", 1)],
            },
            ArchiveCapture {
                captured_at: at(1),
                snapshots: vec![snapshot("p1", "Game A", 3)],
            },
        ];

        history.backfill(&captures).unwrap();
        let records = history.read_all().unwrap();
        assert_eq!(records[0].timestamp, at(1));
        assert_eq!(records[1].timestamp, at(3));
    }

    #[test]
    fn test_unwritable_destination_is_fatal() {
        let tmp = TempDir::new().unwrap();

        // A regular file where a parent directory is expected
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let history = CsvHistory::new(blocker.join("sub/keys.csv"));
        let err = history
            .append_current(&[snapshot("p1", "Game A", 42)], at(1))
            .unwrap_err();
        assert!(matches!(err, crate::error::AppError::Io(_)));

        // Nothing was flushed; the store still reads as empty
        assert!(history.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_quoted_fields_round_trip() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        let mut tricky = snapshot("p1", "Game", 1);
        tricky.title = "Commas, \"quotes\" and\nnewlines".to_string();
        history.append_current(&[tricky.clone()], at(1)).unwrap();

        let records = history.read_all().unwrap();
        assert_eq!(records[0].title, tricky.title);
    }

    #[test]
    fn test_header_written_once() {
        let tmp = TempDir::new().unwrap();
        let history = store(&tmp);

        history
            .append_current(&[snapshot("p1", "Game A", 1)], at(1))
            .unwrap();
        history
            .append_current(&[snapshot("p1", "Game A", 2)], at(2))
            .unwrap();

        let text = std::fs::read_to_string(history.path()).unwrap();
        let headers = text.lines().filter(|l| l.starts_with("timestamp,")).count();
        assert_eq!(headers, 1);
        assert!(
            text.starts_with("timestamp,promotion_id,title,slug,keys_available,status")
        );
    }
}
