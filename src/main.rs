// src/main.rs

//! promowatch CLI
//!
//! Single-shot entry point intended to run on a schedule: one invocation
//! fetches one snapshot, appends to the availability history, rebuilds the
//! RSS feed, and exits.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};

use promowatch::error::Result;
use promowatch::models::Config;
use promowatch::pipeline;

/// promowatch - AMD Gaming promotions tracker
#[derive(Parser, Debug)]
#[command(name = "promowatch", version, about = "AMD Gaming promotions tracker")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "promowatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch promotions, log availability, and rebuild the feed
    Update,

    /// Append availability rows from the saved response
    Log,

    /// Rebuild the feed from the saved response
    Feed,

    /// Backfill the history CSV from the git history of the saved response
    Backfill {
        /// Repository root whose history holds the archived responses
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let load = || Config::load_or_default(&cli.config);
    let now = Utc::now();

    match cli.command {
        Command::Update => pipeline::run_update(&load(), now).await?,
        Command::Log => {
            let written = pipeline::run_log(&load(), now).await?;
            log::info!("Appended {written} rows");
        }
        Command::Feed => pipeline::run_feed(&load(), now).await?,
        Command::Backfill { repo_root } => {
            pipeline::run_backfill(&load(), &repo_root)?;
        }
        Command::Validate => pipeline::run_validate(&cli.config)?,
    }

    Ok(())
}
