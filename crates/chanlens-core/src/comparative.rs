//! Cross-channel rankings and the pooled outlier leaderboard.

use serde::{Deserialize, Serialize};

use crate::analytics::{round_to, AnalyticsConfig, ChannelSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewsRankEntry {
    pub channel_id: String,
    pub channel_name: String,
    pub total_period_views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRankEntry {
    pub channel_id: String,
    pub channel_name: String,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRankEntry {
    pub channel_id: String,
    pub channel_name: String,
    pub highest_outlier_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub channel_id: String,
    pub channel_name: String,
    pub title: String,
    pub video_id: String,
    pub views: u64,
    pub outlier_score: f64,
    pub engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeResult {
    pub views_ranking: Vec<ViewsRankEntry>,
    pub engagement_ranking: Vec<EngagementRankEntry>,
    pub outlier_ranking: Vec<OutlierRankEntry>,
    /// Channel name at the head of `views_ranking`.
    pub top_performer: Option<String>,
    pub cross_channel_leaderboard: Vec<LeaderboardEntry>,
}

impl ComparativeResult {
    /// 1-based position of `channel_id` in the views ranking.
    #[must_use]
    pub fn views_rank_of(&self, channel_id: &str) -> Option<usize> {
        self.views_ranking
            .iter()
            .position(|r| r.channel_id == channel_id)
            .map(|i| i + 1)
    }

    /// 1-based position of `channel_id` in the engagement ranking.
    #[must_use]
    pub fn engagement_rank_of(&self, channel_id: &str) -> Option<usize> {
        self.engagement_ranking
            .iter()
            .position(|r| r.channel_id == channel_id)
            .map(|i| i + 1)
    }
}

/// Rank the primary channel against its competitors with the default configuration.
#[must_use]
pub fn build_comparative(primary: &ChannelSummary, competitors: &[ChannelSummary]) -> ComparativeResult {
    build_comparative_with(&AnalyticsConfig::default(), primary, competitors)
}

pub(crate) fn build_comparative_with(
    config: &AnalyticsConfig,
    primary: &ChannelSummary,
    competitors: &[ChannelSummary],
) -> ComparativeResult {
    let cohort: Vec<&ChannelSummary> = std::iter::once(primary).chain(competitors).collect();

    // Every sort below is `sort_by`, which is stable, so ties keep cohort order.
    let mut by_views = cohort.clone();
    by_views.sort_by(|a, b| b.total_period_views.cmp(&a.total_period_views));

    let mut by_engagement = cohort.clone();
    by_engagement.sort_by(|a, b| b.avg_engagement.total_cmp(&a.avg_engagement));

    let mut by_outlier = cohort.clone();
    by_outlier.sort_by(|a, b| b.best_outlier_score().total_cmp(&a.best_outlier_score()));

    let top_performer = by_views.first().map(|s| s.channel_name.clone());

    let mut pooled: Vec<LeaderboardEntry> = cohort
        .iter()
        .flat_map(|s| {
            s.period_videos.iter().map(move |v| LeaderboardEntry {
                channel_id: s.channel_id.clone(),
                channel_name: s.channel_name.clone(),
                title: v.video.title.clone(),
                video_id: v.video.video_id.clone(),
                views: v.video.views,
                outlier_score: v.outlier_score,
                engagement: round_to(v.engagement, config.engagement_precision),
            })
        })
        .collect();
    pooled.sort_by(|a, b| b.outlier_score.total_cmp(&a.outlier_score));
    pooled.truncate(config.leaderboard_limit);

    ComparativeResult {
        views_ranking: by_views
            .iter()
            .map(|s| ViewsRankEntry {
                channel_id: s.channel_id.clone(),
                channel_name: s.channel_name.clone(),
                total_period_views: s.total_period_views,
            })
            .collect(),
        engagement_ranking: by_engagement
            .iter()
            .map(|s| EngagementRankEntry {
                channel_id: s.channel_id.clone(),
                channel_name: s.channel_name.clone(),
                avg_engagement: s.avg_engagement,
            })
            .collect(),
        outlier_ranking: by_outlier
            .iter()
            .map(|s| OutlierRankEntry {
                channel_id: s.channel_id.clone(),
                channel_name: s.channel_name.clone(),
                highest_outlier_score: s.best_outlier_score(),
            })
            .collect(),
        top_performer,
        cross_channel_leaderboard: pooled,
    }
}
