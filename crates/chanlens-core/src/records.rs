use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Primary,
    #[default]
    Competitor,
}

impl std::fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelRole::Primary => write!(f, "primary"),
            ChannelRole::Competitor => write!(f, "competitor"),
        }
    }
}

/// One published video as delivered by the data-fetch layer.
///
/// `video_id`, `title` and `published_at` are required; counters default to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub duration_seconds: u64,
}

/// A [`Video`] with the derived metrics appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVideo {
    #[serde(flatten)]
    pub video: Video,
    pub engagement: f64,
    pub outlier_score: f64,
}

/// Raw per-channel input: metadata plus the period and baseline cohorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    pub channel_id: String,
    pub channel_name: String,
    #[serde(default)]
    pub subscriber_count: Option<u64>,
    #[serde(default)]
    pub total_views: u64,
    #[serde(default)]
    pub uploads_playlist_id: Option<String>,
    #[serde(default)]
    pub role: ChannelRole,
    pub period_videos: Vec<Video>,
    pub baseline_videos: Vec<Video>,
}

impl ChannelData {
    #[must_use]
    pub fn with_role(mut self, role: ChannelRole) -> Self {
        self.role = role;
        self
    }
}

fn default_days() -> u32 {
    60
}

/// The `raw_data.json` shape: one primary channel, its competitors, and the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_days")]
    pub days: u32,
    pub channel: ChannelData,
    pub competitors: Vec<ChannelData>,
}

impl AnalyticsInput {
    /// Parse a `raw_data.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Input`] when a required field is absent or mistyped.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|source| CoreError::Input {
            context: "raw data".to_string(),
            source,
        })
    }

    /// Total number of period videos across every channel.
    #[must_use]
    pub fn total_period_videos(&self) -> usize {
        self.channel.period_videos.len()
            + self
                .competitors
                .iter()
                .map(|c| c.period_videos.len())
                .sum::<usize>()
    }
}
