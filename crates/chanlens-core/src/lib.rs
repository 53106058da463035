//! Core types and the analytics engine for chanlens.
//!
//! Everything in this crate is pure: raw per-channel cohorts go in, channel
//! summaries and cross-channel rankings come out. Network access, rendering,
//! and language-model calls live in the sibling crates.

pub mod analytics;
pub mod app_config;
pub mod channels;
pub mod comparative;
pub mod config;
pub mod error;
#[cfg(test)]
mod fixtures;
pub mod format;
pub mod insights;
pub mod narrative;
pub mod records;

pub use analytics::{
    build_summary, engagement, process_all, round_to, score_outliers, AnalyticsConfig,
    AnalyticsOutput, Analyzer, ChannelSummary, TopVideo,
};
pub use app_config::{AppConfig, Environment};
pub use channels::{
    dedupe_competitors, load_channel_set, normalize_handle, validate_competitor_count, ChannelSet,
};
pub use comparative::{
    build_comparative, ComparativeResult, EngagementRankEntry, LeaderboardEntry, OutlierRankEntry,
    ViewsRankEntry,
};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use insights::{ComparativeAnalysis, Insights, VideoIdea};
pub use narrative::{Narrative, NarrativeConfig};
pub use records::{AnalyticsInput, ChannelData, ChannelRole, ScoredVideo, Video};
