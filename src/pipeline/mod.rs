// src/pipeline/mod.rs

//! Pipeline entry points for promowatch operations.
//!
//! - `run_update`: fetch a snapshot, log availability, rebuild the feed
//! - `run_log` / `run_feed`: re-run one half against the saved response
//! - `run_backfill`: merge archived captures into the history CSV
//! - `run_validate`: check the configuration file

pub mod backfill;
pub mod update;
pub mod validate;

pub use backfill::run_backfill;
pub use update::{run_feed, run_log, run_update};
pub use validate::run_validate;
