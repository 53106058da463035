//! Plain-text digest of an analytics run, embedded in every prompt.

use std::fmt::Write;

use chanlens_core::format;
use chanlens_core::{AnalyticsOutput, ChannelSummary};

fn push_channel(out: &mut String, channel: &ChannelSummary) {
    let subscribers = channel
        .subscriber_count
        .map_or_else(|| "hidden".to_string(), format::number);
    let _ = writeln!(out, "Subscribers: {subscribers}");
    let _ = writeln!(out, "Period Views: {}", format::number(channel.total_period_views));
    let _ = writeln!(out, "Videos Published: {}", channel.video_count);
    let _ = writeln!(out, "Avg Engagement: {:.2}%", channel.avg_engagement);
    let _ = writeln!(out, "Upload Frequency: {:.1}/week", channel.upload_frequency);
    let _ = writeln!(out, "Top Videos:");
    for video in &channel.top_videos {
        let _ = writeln!(
            out,
            "  - \"{}\" — {} views, {:.1}% eng, {:.2}x outlier",
            video.title,
            format::number(video.views),
            video.engagement,
            video.outlier_score
        );
    }
}

/// Summarize channels, rankings and the leaderboard for a prompt.
#[must_use]
pub fn build_context(analytics: &AnalyticsOutput) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== YOUR CHANNEL ===");
    let _ = writeln!(out, "Name: {}", analytics.channel.channel_name);
    push_channel(&mut out, &analytics.channel);

    for competitor in &analytics.competitors {
        let _ = writeln!(out, "\n=== COMPETITOR: {} ===", competitor.channel_name);
        push_channel(&mut out, competitor);
    }

    let comparative = &analytics.comparative;
    let _ = writeln!(out, "\n=== COMPARATIVE RANKINGS ===");
    let _ = writeln!(out, "Views Ranking:");
    for entry in &comparative.views_ranking {
        let _ = writeln!(
            out,
            "  {}: {}",
            entry.channel_name,
            format::number(entry.total_period_views)
        );
    }
    let _ = writeln!(out, "Engagement Ranking:");
    for entry in &comparative.engagement_ranking {
        let _ = writeln!(out, "  {}: {:.2}%", entry.channel_name, entry.avg_engagement);
    }
    let _ = writeln!(
        out,
        "Top Performer: {}",
        comparative.top_performer.as_deref().unwrap_or("N/A")
    );

    let _ = writeln!(out, "\nCross-Channel Outlier Leaderboard:");
    for video in &comparative.cross_channel_leaderboard {
        let _ = writeln!(
            out,
            "  - \"{}\" by {} — {} views, {:.2}x outlier, {:.1}% eng",
            video.title,
            video.channel_name,
            format::number(video.views),
            video.outlier_score,
            video.engagement
        );
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use chanlens_core::{process_all, AnalyticsInput};

    use super::*;

    fn analytics() -> AnalyticsOutput {
        let input = AnalyticsInput::from_json(
            r#"{
                "days": 30,
                "channel": {
                    "channel_id": "UCa", "channel_name": "Alpha", "subscriber_count": 12000,
                    "period_videos": [
                        {"video_id": "a1", "title": "Alpha One", "published_at": "2026-01-10T00:00:00Z",
                         "views": 2000, "likes": 90, "comments": 10}
                    ],
                    "baseline_videos": [
                        {"video_id": "a1", "title": "Alpha One", "published_at": "2026-01-10T00:00:00Z",
                         "views": 1000}
                    ]
                },
                "competitors": [{
                    "channel_id": "UCb", "channel_name": "Beta",
                    "period_videos": [], "baseline_videos": []
                }]
            }"#,
        )
        .unwrap();
        process_all(&input)
    }

    #[test]
    fn context_lists_channels_rankings_and_leaderboard() {
        let context = build_context(&analytics());

        assert!(context.starts_with("=== YOUR CHANNEL ===\nName: Alpha\nSubscribers: 12,000"));
        assert!(context.contains("Period Views: 2,000"));
        assert!(context.contains("Avg Engagement: 5.00%"));
        assert!(context.contains("  - \"Alpha One\" — 2,000 views, 5.0% eng, 2.00x outlier"));
        assert!(context.contains("=== COMPETITOR: Beta ===\nSubscribers: hidden"));
        assert!(context.contains("Views Ranking:\n  Alpha: 2,000\n  Beta: 0"));
        assert!(context.contains("Top Performer: Alpha"));
        assert!(context.ends_with("  - \"Alpha One\" by Alpha — 2,000 views, 2.00x outlier, 5.0% eng"));
    }
}
