// src/archive.rs

//! Archive capture reconstruction from git history.
//!
//! The saved raw response file is committed on every run, so its git history
//! is a sequence of timestamped snapshot captures. This module walks that
//! history and parses each revision into an [`ArchiveCapture`], oldest
//! first. The history store consumes the captures without knowing where
//! they came from.
//!
//! Commits where the file is missing or unparsable are skipped with a
//! warning; backfill works from whatever capture points survive.

use std::path::PathBuf;
use std::process::{Command, Output};

use chrono::DateTime;

use crate::error::{AppError, Result};
use crate::models::ArchiveCapture;
use crate::snapshot;

/// Producer of archive captures from the git history of one file.
#[derive(Debug, Clone)]
pub struct GitArchive {
    repo_root: PathBuf,
    file: PathBuf,
}

impl GitArchive {
    /// Create an archive over `file` (relative to `repo_root`).
    pub fn new(repo_root: impl Into<PathBuf>, file: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            file: file.into(),
        }
    }

    /// Reconstruct all captures, oldest first.
    pub fn captures(&self) -> Result<Vec<ArchiveCapture>> {
        let commits = self.commit_list()?;
        log::info!(
            "Found {} commits touching {}",
            commits.len(),
            self.file.display()
        );

        let mut captures = Vec::with_capacity(commits.len());
        for (sha, unix_ts) in commits {
            let Some(content) = self.file_at(&sha)? else {
                continue;
            };

            let snapshots = match snapshot::parse_str(&content) {
                Ok(snapshots) => snapshots,
                Err(e) => {
                    log::warn!("Skipping commit {sha}: {e}");
                    continue;
                }
            };

            let captured_at = DateTime::from_timestamp(unix_ts, 0)
                .ok_or_else(|| AppError::archive(&sha, format!("bad timestamp {unix_ts}")))?;

            captures.push(ArchiveCapture {
                captured_at,
                snapshots,
            });
        }

        Ok(captures)
    }

    /// List of (sha, commit unix timestamp) for the file, oldest first.
    fn commit_list(&self) -> Result<Vec<(String, i64)>> {
        let file = self.file.to_string_lossy();
        let output = self.run_git(&[
            "--no-pager",
            "log",
            "--follow",
            "--format=%H|%ct",
            "--",
            &file,
        ])?;

        if !output.status.success() {
            return Err(AppError::archive(
                file,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(parse_log(&String::from_utf8_lossy(&output.stdout)))
    }

    /// File content at the given commit, or None if absent there.
    fn file_at(&self, sha: &str) -> Result<Option<String>> {
        let rev = format!("{}:{}", sha, self.file.to_string_lossy());
        let output = self.run_git(&["show", &rev])?;

        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()?)
    }
}

/// Parse `git log --format=%H|%ct` output, reversing to oldest-first order.
fn parse_log(stdout: &str) -> Vec<(String, i64)> {
    let mut commits: Vec<(String, i64)> = stdout
        .lines()
        .filter_map(|line| {
            let (sha, ts) = line.trim().split_once('|')?;
            match ts.parse::<i64>() {
                Ok(ts) => Some((sha.to_string(), ts)),
                Err(_) => {
                    log::warn!("Skipping malformed log line: {line}");
                    None
                }
            }
        })
        .collect();

    commits.reverse();
    commits
}
