//! The text rendered into a report.
//!
//! When language-model [`Insights`] are available their sections are used
//! as-is; every missing section is filled by a deterministic, data-derived
//! fallback built from the analytics output alone.

use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsOutput, ChannelSummary};
use crate::comparative::LeaderboardEntry;
use crate::format;
use crate::insights::{Insights, VideoIdea};

/// Thresholds and list caps for the fallback narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeConfig {
    /// A competitor uploading more than `primary * ratio` videos/week is a gap.
    pub frequency_gap_ratio: f64,
    pub engagement_gap_ratio: f64,
    pub views_gap_ratio: f64,
    /// Competitor names quoted per gap bullet.
    pub gap_names_limit: usize,
    pub max_trends: usize,
    pub max_gaps: usize,
    /// Leaderboard entries inspected for the concentration trend.
    pub concentration_window: usize,
    /// Channels named in the "spread across" trend.
    pub spread_names_limit: usize,
    pub idea_count: usize,
    pub takeaway_count: usize,
    pub overview_title_len: usize,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            frequency_gap_ratio: 1.5,
            engagement_gap_ratio: 1.2,
            views_gap_ratio: 1.5,
            gap_names_limit: 2,
            max_trends: 3,
            max_gaps: 3,
            concentration_window: 5,
            spread_names_limit: 3,
            idea_count: 5,
            takeaway_count: 3,
            overview_title_len: 40,
        }
    }
}

pub const NO_GAPS: &str =
    "No significant content gaps identified — channel is competitive across key metrics";

pub const ENABLE_AI_TAKEAWAY: &str =
    "Enable AI insights for personalized content strategy recommendations and data-driven video ideas.";

pub const NO_VIDEOS_TAKEAWAY: &str =
    "No videos were published in the analysis window across the compared channels.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub overview: String,
    pub trends: Vec<String>,
    pub gaps: Vec<String>,
    /// Top performer's channel name, `N/A` for an empty cohort.
    pub top_performer: String,
    pub top_performer_note: String,
    pub ideas: Vec<VideoIdea>,
    pub takeaways: Vec<String>,
}

impl Narrative {
    /// Narrative built only from analytics data.
    #[must_use]
    pub fn fallback(analytics: &AnalyticsOutput) -> Self {
        Self::resolve(analytics, None, &NarrativeConfig::default())
    }

    /// Merge language-model insights with the fallback, section by section.
    #[must_use]
    pub fn resolve(
        analytics: &AnalyticsOutput,
        insights: Option<&Insights>,
        config: &NarrativeConfig,
    ) -> Self {
        let builder = FallbackBuilder { analytics, config };
        let comparative = insights
            .map(|i| &i.comparative_analysis)
            .filter(|c| !c.overview.is_empty() || !c.key_trends.is_empty() || !c.content_gaps.is_empty());

        let (overview, trends, gaps) = match comparative {
            Some(c) => (c.overview.clone(), c.key_trends.clone(), c.content_gaps.clone()),
            None => (builder.overview(), builder.trends(), builder.gaps()),
        };

        let top_performer_note = comparative
            .map(|c| c.top_performer_note.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| builder.top_performer_note());

        let mut ideas = match insights.filter(|i| !i.video_ideas.is_empty()) {
            Some(i) => i.video_ideas.iter().take(config.idea_count).cloned().collect(),
            None => builder.ideas(),
        };
        while ideas.len() < config.idea_count {
            ideas.push(VideoIdea {
                title: format!("Video Idea #{}", ideas.len() + 1),
                title_variations: Vec::new(),
                hooks: Vec::new(),
                topic: String::new(),
            });
        }

        let takeaways = match insights.filter(|i| !i.takeaways.is_empty()) {
            Some(i) => i.takeaways.iter().take(config.takeaway_count).cloned().collect(),
            None => builder.takeaways(),
        };

        Self {
            overview,
            trends,
            gaps,
            top_performer: builder.top_performer_name().to_string(),
            top_performer_note,
            ideas,
            takeaways,
        }
    }
}

struct FallbackBuilder<'a> {
    analytics: &'a AnalyticsOutput,
    config: &'a NarrativeConfig,
}

impl FallbackBuilder<'_> {
    fn primary(&self) -> &ChannelSummary {
        &self.analytics.channel
    }

    fn top_performer_name(&self) -> &str {
        self.analytics
            .comparative
            .top_performer
            .as_deref()
            .unwrap_or("N/A")
    }

    fn top_video(&self) -> Option<&LeaderboardEntry> {
        self.analytics.comparative.cross_channel_leaderboard.first()
    }

    fn overview(&self) -> String {
        let primary = self.primary();
        let comparative = &self.analytics.comparative;
        let name = &primary.channel_name;

        let mut parts = vec![format!(
            "Analysis of {name} against {} competitors.",
            self.analytics.competitors.len()
        )];

        if let Some(views_rank) = comparative.views_rank_of(&primary.channel_id) {
            match comparative.engagement_rank_of(&primary.channel_id) {
                Some(eng_rank) => parts.push(format!(
                    "{name} ranks #{views_rank} in total period views and #{eng_rank} in average engagement."
                )),
                None => parts.push(format!("{name} ranks #{views_rank} in total period views.")),
            }
        }

        parts.push(format!("Top performer by views: {}.", self.top_performer_name()));

        if let Some(top) = self.top_video() {
            parts.push(format!(
                "Highest outlier video: \"{}\" by {} ({} median, {} views).",
                format::truncate(&top.title, self.config.overview_title_len),
                top.channel_name,
                format::outlier(top.outlier_score),
                format::number(top.views),
            ));
        }

        parts.join(" ")
    }

    fn trends(&self) -> Vec<String> {
        let comparative = &self.analytics.comparative;
        let mut trends = Vec::new();

        if comparative.views_ranking.len() >= 2 {
            let top = &comparative.views_ranking[0];
            trends.push(format!(
                "{} leads in views with {} total period views",
                top.channel_name,
                format::number(top.total_period_views)
            ));
        }

        if let Some(top) = comparative.engagement_ranking.first() {
            trends.push(format!(
                "{} has highest engagement at {}",
                top.channel_name,
                format::engagement(top.avg_engagement)
            ));
        }

        let mut channels: Vec<&str> = Vec::new();
        for entry in comparative
            .cross_channel_leaderboard
            .iter()
            .take(self.config.concentration_window)
        {
            if !channels.contains(&entry.channel_name.as_str()) {
                channels.push(&entry.channel_name);
            }
        }
        match channels.as_slice() {
            [] => {}
            [only] => trends.push(format!("{only} dominates the top outlier videos")),
            many => {
                let shown: Vec<&str> = many
                    .iter()
                    .take(self.config.spread_names_limit)
                    .copied()
                    .collect();
                trends.push(format!(
                    "Top outlier videos spread across {}",
                    shown.join(", ")
                ));
            }
        }

        trends.truncate(self.config.max_trends);
        trends
    }

    fn gap_names<F>(&self, exceeds: F) -> Option<String>
    where
        F: Fn(&ChannelSummary) -> bool,
    {
        let names: Vec<&str> = self
            .analytics
            .competitors
            .iter()
            .filter(|c| exceeds(c))
            .take(self.config.gap_names_limit)
            .map(|c| c.channel_name.as_str())
            .collect();
        (!names.is_empty()).then(|| names.join(", "))
    }

    #[allow(clippy::cast_precision_loss)]
    fn gaps(&self) -> Vec<String> {
        let primary = self.primary();
        let cfg = self.config;
        let mut gaps = Vec::new();

        let freq_floor = primary.upload_frequency * cfg.frequency_gap_ratio;
        if let Some(names) = self.gap_names(|c| c.upload_frequency > freq_floor) {
            gaps.push(format!(
                "Upload frequency gap: {names} publish significantly more often"
            ));
        }

        let eng_floor = primary.avg_engagement * cfg.engagement_gap_ratio;
        if let Some(names) = self.gap_names(|c| c.avg_engagement > eng_floor) {
            gaps.push(format!(
                "Engagement gap: {names} achieve higher engagement rates"
            ));
        }

        let views_floor = primary.total_period_views as f64 * cfg.views_gap_ratio;
        if let Some(names) = self.gap_names(|c| c.total_period_views as f64 > views_floor) {
            gaps.push(format!(
                "Views gap: {names} generate significantly more total views"
            ));
        }

        if gaps.is_empty() {
            gaps.push(NO_GAPS.to_string());
        }
        gaps.truncate(cfg.max_gaps);
        gaps
    }

    fn top_performer_note(&self) -> String {
        let Some(head) = self.analytics.comparative.views_ranking.first() else {
            return String::new();
        };
        let Some(top) = self
            .analytics
            .all_channels()
            .find(|c| c.channel_id == head.channel_id)
        else {
            return String::new();
        };

        let avg_views = if top.video_count == 0 {
            0
        } else {
            top.total_period_views / top.video_count as u64
        };
        format!(
            "{} avg views/video across {} videos",
            format::number(avg_views),
            top.video_count
        )
    }

    fn ideas(&self) -> Vec<VideoIdea> {
        let mut ideas: Vec<VideoIdea> = self
            .analytics
            .comparative
            .cross_channel_leaderboard
            .iter()
            .take(self.config.idea_count)
            .map(idea_from_video)
            .collect();

        while ideas.len() < self.config.idea_count {
            ideas.push(VideoIdea {
                title: format!("Video Idea #{} — AI insights pending", ideas.len() + 1),
                title_variations: vec![
                    "AI-generated ideas will appear here once AI insights are enabled"
                        .to_string();
                    5
                ],
                hooks: vec!["Hook content will be generated by AI analysis.".to_string(); 2],
                topic: "Pending AI analysis".to_string(),
            });
        }
        ideas
    }

    fn takeaways(&self) -> Vec<String> {
        let primary = self.primary();
        let ranking = &self.analytics.comparative.views_ranking;
        let rank = self
            .analytics
            .comparative
            .views_rank_of(&primary.channel_id)
            .unwrap_or(ranking.len());

        let mut takeaways = vec![format!(
            "{} ranks #{rank} of {} channels in total period views. Top performer is {}.",
            primary.channel_name,
            ranking.len(),
            self.top_performer_name()
        )];

        takeaways.push(match self.top_video() {
            Some(top) => format!(
                "The highest-performing video across all channels is \"{}\" by {} with {} median performance.",
                format::truncate(&top.title, self.config.overview_title_len),
                top.channel_name,
                format::outlier(top.outlier_score)
            ),
            None => NO_VIDEOS_TAKEAWAY.to_string(),
        });

        takeaways.push(ENABLE_AI_TAKEAWAY.to_string());
        takeaways.truncate(self.config.takeaway_count);
        takeaways
    }
}

fn idea_from_video(video: &LeaderboardEntry) -> VideoIdea {
    let channel = &video.channel_name;
    VideoIdea {
        title: format!("Inspired by: {}", format::truncate(&video.title, 45)),
        title_variations: vec![
            format!("Variation on: {}", format::truncate(&video.title, 40)),
            format!("Our take on {channel}'s top video"),
            format!("Why \"{}\" went viral", format::truncate(&video.title, 30)),
            format!(
                "Response to {channel}: {}",
                format::truncate(&video.title, 25)
            ),
            format!("Deep dive: {}", format::truncate(&video.title, 35)),
        ],
        hooks: vec![
            format!(
                "This video by {channel} got {} views and scored {} — here's what made it work.",
                format::number(video.views),
                format::outlier(video.outlier_score)
            ),
            format!(
                "With {} engagement, this topic clearly resonates with the audience. Here's how to put your own spin on it.",
                format::engagement(video.engagement)
            ),
        ],
        topic: format!(
            "Based on {channel}'s outlier ({})",
            format::outlier(video.outlier_score)
        ),
    }
}

#[cfg(test)]
#[path = "narrative_test.rs"]
mod tests;
