//! Engagement and outlier scoring, per-channel summaries, and the
//! [`process_all`] entry point.
//!
//! All functions are pure: inputs are borrowed, outputs are freshly built.

use serde::{Deserialize, Serialize};

use crate::comparative::{self, ComparativeResult};
use crate::records::{AnalyticsInput, ChannelData, ChannelRole, ScoredVideo, Video};
use crate::CoreError;

/// Caps and rounding precisions used by the analytics engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Number of videos kept in each channel's `top_videos`.
    pub top_videos_limit: usize,
    /// Number of entries kept in the cross-channel leaderboard.
    pub leaderboard_limit: usize,
    pub score_precision: u8,
    pub engagement_precision: u8,
    pub duration_precision: u8,
    pub frequency_precision: u8,
    pub days_per_week: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_videos_limit: 5,
            leaderboard_limit: 10,
            score_precision: 2,
            engagement_precision: 2,
            duration_precision: 1,
            frequency_precision: 2,
            days_per_week: 7.0,
        }
    }
}

/// Lean projection of a scored video used in channel summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopVideo {
    pub title: String,
    pub video_id: String,
    pub views: u64,
    pub engagement: f64,
    pub outlier_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: String,
    pub channel_name: String,
    pub role: ChannelRole,
    pub subscriber_count: Option<u64>,
    pub total_period_views: u64,
    pub video_count: usize,
    pub avg_engagement: f64,
    pub avg_duration: f64,
    /// Videos per week over the analysis window.
    pub upload_frequency: f64,
    pub top_videos: Vec<TopVideo>,
    pub period_videos: Vec<ScoredVideo>,
}

impl ChannelSummary {
    /// Outlier score of this channel's best video, or 0 when it has none.
    #[must_use]
    pub fn best_outlier_score(&self) -> f64 {
        self.top_videos.first().map_or(0.0, |v| v.outlier_score)
    }
}

fn default_days() -> u32 {
    60
}

/// The `analytics.json` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOutput {
    #[serde(default = "default_days")]
    pub days: u32,
    pub channel: ChannelSummary,
    pub competitors: Vec<ChannelSummary>,
    pub comparative: ComparativeResult,
}

impl AnalyticsOutput {
    /// Parse an `analytics.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Input`] when a required field is absent or mistyped.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|source| CoreError::Input {
            context: "analytics".to_string(),
            source,
        })
    }

    /// Primary summary followed by competitors, in input order.
    pub fn all_channels(&self) -> impl Iterator<Item = &ChannelSummary> {
        std::iter::once(&self.channel).chain(self.competitors.iter())
    }
}

/// Round half away from zero to `precision` decimal places.
#[must_use]
pub fn round_to(value: f64, precision: u8) -> f64 {
    let factor = 10f64.powi(i32::from(precision));
    (value * factor).round() / factor
}

/// Engagement rate in percent: `(likes + comments) / views * 100`, or 0 for unviewed videos.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement(video: &Video) -> f64 {
    if video.views == 0 {
        return 0.0;
    }
    (video.likes + video.comments) as f64 / video.views as f64 * 100.0
}

#[allow(clippy::cast_precision_loss)]
fn median_views(videos: &[Video]) -> f64 {
    let mut views: Vec<u64> = videos.iter().map(|v| v.views).collect();
    if views.is_empty() {
        return 0.0;
    }
    views.sort_unstable();
    let mid = views.len() / 2;
    if views.len() % 2 == 0 {
        (views[mid - 1] as f64 + views[mid] as f64) / 2.0
    } else {
        views[mid] as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Analytics engine bound to one [`AnalyticsConfig`].
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyticsConfig,
}

impl Analyzer {
    #[must_use]
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Score every period video against the median views of the baseline.
    ///
    /// Output order matches `period_videos`. An empty baseline, or one whose
    /// median is 0, scores every video 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score_outliers(&self, period_videos: &[Video], baseline_videos: &[Video]) -> Vec<ScoredVideo> {
        let median = median_views(baseline_videos);
        period_videos
            .iter()
            .map(|video| {
                let outlier_score = if median > 0.0 {
                    round_to(video.views as f64 / median, self.config.score_precision)
                } else {
                    0.0
                };
                ScoredVideo {
                    video: video.clone(),
                    engagement: engagement(video),
                    outlier_score,
                }
            })
            .collect()
    }

    /// Build the summary for one channel, keeping the role it carries.
    #[must_use]
    pub fn build_summary(&self, channel: &ChannelData, window_days: u32) -> ChannelSummary {
        self.summarize(channel, channel.role, window_days)
    }

    #[allow(clippy::cast_precision_loss)]
    fn summarize(&self, channel: &ChannelData, role: ChannelRole, window_days: u32) -> ChannelSummary {
        let cfg = &self.config;
        let period_videos = self.score_outliers(&channel.period_videos, &channel.baseline_videos);

        let total_period_views = period_videos.iter().map(|v| v.video.views).sum();
        let video_count = period_videos.len();

        let avg_engagement = round_to(
            mean(period_videos.iter().map(|v| v.engagement)),
            cfg.engagement_precision,
        );
        let avg_duration = round_to(
            mean(period_videos.iter().map(|v| v.video.duration_seconds as f64)),
            cfg.duration_precision,
        );

        let weeks = (f64::from(window_days) / cfg.days_per_week).max(1.0);
        let upload_frequency = round_to(video_count as f64 / weeks, cfg.frequency_precision);

        ChannelSummary {
            channel_id: channel.channel_id.clone(),
            channel_name: channel.channel_name.clone(),
            role,
            subscriber_count: channel.subscriber_count,
            total_period_views,
            video_count,
            avg_engagement,
            avg_duration,
            upload_frequency,
            top_videos: self.rank_top_videos(&period_videos),
            period_videos,
        }
    }

    fn rank_top_videos(&self, scored: &[ScoredVideo]) -> Vec<TopVideo> {
        let mut ranked: Vec<&ScoredVideo> = scored.iter().collect();
        // `sort_by` is stable: equal scores keep their upload order.
        ranked.sort_by(|a, b| b.outlier_score.total_cmp(&a.outlier_score));
        ranked
            .into_iter()
            .take(self.config.top_videos_limit)
            .map(|v| TopVideo {
                title: v.video.title.clone(),
                video_id: v.video.video_id.clone(),
                views: v.video.views,
                engagement: round_to(v.engagement, self.config.engagement_precision),
                outlier_score: v.outlier_score,
            })
            .collect()
    }

    #[must_use]
    pub fn build_comparative(
        &self,
        primary: &ChannelSummary,
        competitors: &[ChannelSummary],
    ) -> ComparativeResult {
        comparative::build_comparative_with(&self.config, primary, competitors)
    }

    /// Summarize the primary channel and every competitor, then rank them.
    ///
    /// Roles are assigned by position: the input's `channel` is always the
    /// primary, every entry of `competitors` a competitor.
    #[must_use]
    pub fn process_all(&self, input: &AnalyticsInput) -> AnalyticsOutput {
        let channel = self.summarize(&input.channel, ChannelRole::Primary, input.days);
        let competitors: Vec<ChannelSummary> = input
            .competitors
            .iter()
            .map(|c| self.summarize(c, ChannelRole::Competitor, input.days))
            .collect();
        let comparative = self.build_comparative(&channel, &competitors);

        AnalyticsOutput {
            days: input.days,
            channel,
            competitors,
            comparative,
        }
    }
}

/// [`Analyzer::score_outliers`] with the default configuration.
#[must_use]
pub fn score_outliers(period_videos: &[Video], baseline_videos: &[Video]) -> Vec<ScoredVideo> {
    Analyzer::default().score_outliers(period_videos, baseline_videos)
}

/// [`Analyzer::build_summary`] with the default configuration.
#[must_use]
pub fn build_summary(channel: &ChannelData, window_days: u32) -> ChannelSummary {
    Analyzer::default().build_summary(channel, window_days)
}

/// [`Analyzer::process_all`] with the default configuration.
#[must_use]
pub fn process_all(input: &AnalyticsInput) -> AnalyticsOutput {
    Analyzer::default().process_all(input)
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
