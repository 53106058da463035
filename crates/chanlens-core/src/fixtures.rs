//! Record builders shared by the unit tests in this crate.

use chrono::{TimeZone, Utc};

use crate::analytics::{ChannelSummary, TopVideo};
use crate::records::{ChannelData, ChannelRole, ScoredVideo, Video};

pub(crate) fn video(id: &str, views: u64, likes: u64, comments: u64) -> Video {
    Video {
        video_id: id.to_string(),
        title: format!("Video {id}"),
        published_at: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        views,
        likes,
        comments,
        duration_seconds: 600,
    }
}

pub(crate) fn videos_with_views(prefix: &str, views: &[u64]) -> Vec<Video> {
    views
        .iter()
        .enumerate()
        .map(|(i, &v)| video(&format!("{prefix}{i}"), v, 0, 0))
        .collect()
}

pub(crate) fn channel(id: &str, name: &str, period: Vec<Video>, baseline: Vec<Video>) -> ChannelData {
    ChannelData {
        channel_id: id.to_string(),
        channel_name: name.to_string(),
        subscriber_count: Some(1_000),
        total_views: 0,
        uploads_playlist_id: None,
        role: ChannelRole::Competitor,
        period_videos: period,
        baseline_videos: baseline,
    }
}

/// A summary with the given totals and no videos.
pub(crate) fn summary(name: &str, total_period_views: u64, avg_engagement: f64) -> ChannelSummary {
    ChannelSummary {
        channel_id: format!("UC-{name}"),
        channel_name: name.to_string(),
        role: ChannelRole::Competitor,
        subscriber_count: None,
        total_period_views,
        video_count: 0,
        avg_engagement,
        avg_duration: 0.0,
        upload_frequency: 0.0,
        top_videos: Vec::new(),
        period_videos: Vec::new(),
    }
}

/// Attach scored videos (and matching `top_videos`) to a summary.
pub(crate) fn with_scores(mut summary: ChannelSummary, scores: &[f64]) -> ChannelSummary {
    let period: Vec<ScoredVideo> = scores
        .iter()
        .enumerate()
        .map(|(i, &score)| ScoredVideo {
            video: video(&format!("{}-{i}", summary.channel_name), 1_000, 10, 0),
            engagement: 1.0,
            outlier_score: score,
        })
        .collect();
    let mut top: Vec<&ScoredVideo> = period.iter().collect();
    top.sort_by(|a, b| b.outlier_score.total_cmp(&a.outlier_score));
    summary.top_videos = top
        .into_iter()
        .take(5)
        .map(|v| TopVideo {
            title: v.video.title.clone(),
            video_id: v.video.video_id.clone(),
            views: v.video.views,
            engagement: v.engagement,
            outlier_score: v.outlier_score,
        })
        .collect();
    summary.video_count = period.len();
    summary.period_videos = period;
    summary
}
