// src/models/mod.rs

//! Domain models for the promowatch application.

mod config;
mod promotion;

// Re-export all public types
pub use config::{ChannelConfig, Config, FetcherConfig, PathsConfig};
pub use promotion::{ArchiveCapture, HistoryRecord, PromotionSnapshot};
