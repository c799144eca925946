// src/pipeline/backfill.rs

//! Backfill pipeline: reconstruct history rows from archived captures.

use std::path::Path;

use crate::archive::GitArchive;
use crate::error::Result;
use crate::history::CsvHistory;
use crate::models::Config;

/// Merge the git history of the saved response into the history CSV.
///
/// Paths from the configuration are resolved against `repo_root`, the
/// repository whose history holds the archived captures. Safe to re-run:
/// rows already present are skipped. Returns the number of rows appended.
pub fn run_backfill(config: &Config, repo_root: &Path) -> Result<usize> {
    let archive = GitArchive::new(repo_root, &config.paths.response_json);
    let captures = archive.captures()?;
    log::info!("Reconstructed {} archive captures", captures.len());

    let history = CsvHistory::new(repo_root.join(&config.paths.history_csv));
    let written = history.backfill(&captures)?;

    log::info!("Backfill complete: {written} rows appended");
    Ok(written)
}
