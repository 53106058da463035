//! Placeholder values for the report template.
//!
//! The template deck carries `{{key}}` tokens. Every key is always
//! produced, so unused competitor, idea and takeaway slots are replaced
//! with empty text rather than left showing their tokens.
//! [`placeholder_keys`] lists them all; `chanlens placeholders` prints them.
//!
//! | Keys | Content |
//! |------|---------|
//! | `title_date`, `title_channel` | title slide |
//! | `{c}_name`, `{c}_subscribers`, `{c}_views`, `{c}_views_label`, `{c}_videos`, `{c}_engagement` | channel stats |
//! | `{c}_v{1..5}_title`, `{c}_v{1..5}_views`, `{c}_v{1..5}_engagement` | top videos |
//! | `comparative_overview`, `comparative_trends`, `comparative_gaps`, `top_performer`, `top_performer_note` | comparison slide |
//! | `idea{n}_number`, `idea{n}_title`, `idea{n}_tv{1..5}`, `idea{n}_hook{1..2}`, `idea{n}_topic` | video ideas, `n` in 1..=5 |
//! | `takeaway{1..3}` | closing slide |
//!
//! `{c}` is `channel` for the primary channel and `comp1` to `comp7` for
//! competitors.

use chanlens_core::format;
use chanlens_core::{AnalyticsOutput, ChannelSummary, Narrative, VideoIdea};
use chrono::{DateTime, Utc};

pub const COMPETITOR_SLOTS: usize = 7;
pub const IDEA_SLOTS: usize = 5;
pub const TAKEAWAY_SLOTS: usize = 3;
const TOP_VIDEO_ROWS: usize = 5;
const TITLE_VARIATIONS: usize = 5;
const HOOKS: usize = 2;
const BULLETS: usize = 3;
const VIDEO_TITLE_MAX: usize = 50;
const EMPTY_ROW: &str = "—";

const CHANNEL_FIELDS: [&str; 6] = [
    "name",
    "subscribers",
    "views",
    "views_label",
    "videos",
    "engagement",
];
const VIDEO_FIELDS: [&str; 3] = ["title", "views", "engagement"];
const COMPARATIVE_FIELDS: [&str; 5] = [
    "comparative_overview",
    "comparative_trends",
    "comparative_gaps",
    "top_performer",
    "top_performer_note",
];

/// `"{channel} YouTube Analytics Report — {Month YYYY}"`.
#[must_use]
pub fn report_title(channel_name: &str, now: DateTime<Utc>) -> String {
    let month = now.format("%B %Y");
    if channel_name.is_empty() {
        format!("YouTube Analytics Report — {month}")
    } else {
        format!("{channel_name} YouTube Analytics Report — {month}")
    }
}

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return "• No data available".to_string();
    }
    items
        .iter()
        .take(BULLETS)
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct Replacements(Vec<(String, String)>);

impl Replacements {
    fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    fn channel(&mut self, prefix: &str, days: u32, channel: Option<&ChannelSummary>) {
        let Some(channel) = channel else {
            for key in CHANNEL_FIELDS {
                self.set(format!("{prefix}_{key}"), "");
            }
            for row in 1..=TOP_VIDEO_ROWS {
                for key in VIDEO_FIELDS {
                    self.set(format!("{prefix}_v{row}_{key}"), "");
                }
            }
            return;
        };

        self.set(format!("{prefix}_name"), channel.channel_name.as_str());
        self.set(
            format!("{prefix}_subscribers"),
            format::optional_number(channel.subscriber_count),
        );
        self.set(format!("{prefix}_views"), format::number(channel.total_period_views));
        self.set(format!("{prefix}_views_label"), format!("VIEWS ({days}D)"));
        self.set(format!("{prefix}_videos"), channel.video_count.to_string());
        self.set(
            format!("{prefix}_engagement"),
            format::engagement(channel.avg_engagement),
        );

        for row in 1..=TOP_VIDEO_ROWS {
            match channel.top_videos.get(row - 1) {
                Some(video) => {
                    self.set(
                        format!("{prefix}_v{row}_title"),
                        format::truncate(&video.title, VIDEO_TITLE_MAX),
                    );
                    self.set(format!("{prefix}_v{row}_views"), format::number(video.views));
                    self.set(
                        format!("{prefix}_v{row}_engagement"),
                        format::engagement(video.engagement),
                    );
                }
                None => {
                    self.set(format!("{prefix}_v{row}_title"), EMPTY_ROW);
                    self.set(format!("{prefix}_v{row}_views"), "");
                    self.set(format!("{prefix}_v{row}_engagement"), "");
                }
            }
        }
    }

    fn idea(&mut self, number: usize, idea: Option<&VideoIdea>) {
        let prefix = format!("idea{number}");
        self.set(format!("{prefix}_number"), number.to_string());

        let title = idea
            .map(|i| i.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Video Idea #{number}"));
        self.set(format!("{prefix}_title"), title);

        for i in 1..=TITLE_VARIATIONS {
            let value = idea
                .and_then(|idea| idea.title_variations.get(i - 1))
                .map_or_else(String::new, |v| format!("{i}. {v}"));
            self.set(format!("{prefix}_tv{i}"), value);
        }
        for i in 1..=HOOKS {
            let value = idea
                .and_then(|idea| idea.hooks.get(i - 1))
                .cloned()
                .unwrap_or_default();
            self.set(format!("{prefix}_hook{i}"), value);
        }

        let topic = idea
            .map(|i| i.topic.as_str())
            .filter(|t| !t.is_empty())
            .map_or_else(String::new, |t| format!("Topic: {t}"));
        self.set(format!("{prefix}_topic"), topic);
    }
}

fn channel_prefixes() -> impl Iterator<Item = String> {
    std::iter::once("channel".to_string())
        .chain((1..=COMPETITOR_SLOTS).map(|slot| format!("comp{slot}")))
}

/// Every key a compatible template may use, in slide order.
#[must_use]
pub fn placeholder_keys() -> Vec<String> {
    let mut keys = vec!["title_date".to_string(), "title_channel".to_string()];
    for prefix in channel_prefixes() {
        keys.extend(CHANNEL_FIELDS.iter().map(|field| format!("{prefix}_{field}")));
        for row in 1..=TOP_VIDEO_ROWS {
            keys.extend(VIDEO_FIELDS.iter().map(|field| format!("{prefix}_v{row}_{field}")));
        }
    }
    keys.extend(COMPARATIVE_FIELDS.iter().map(ToString::to_string));
    for number in 1..=IDEA_SLOTS {
        keys.push(format!("idea{number}_number"));
        keys.push(format!("idea{number}_title"));
        keys.extend((1..=TITLE_VARIATIONS).map(|i| format!("idea{number}_tv{i}")));
        keys.extend((1..=HOOKS).map(|i| format!("idea{number}_hook{i}")));
        keys.push(format!("idea{number}_topic"));
    }
    keys.extend((1..=TAKEAWAY_SLOTS).map(|number| format!("takeaway{number}")));
    keys
}

/// Every `(key, value)` pair for the template, in slide order.
#[must_use]
pub fn build_replacements(
    analytics: &AnalyticsOutput,
    narrative: &Narrative,
    now: DateTime<Utc>,
) -> Vec<(String, String)> {
    let mut out = Replacements(Vec::new());

    out.set(
        "title_date",
        format!("{}  |  {}-Day Analysis Window", now.format("%B %Y"), analytics.days),
    );
    out.set("title_channel", analytics.channel.channel_name.as_str());

    out.channel("channel", analytics.days, Some(&analytics.channel));
    if analytics.competitors.len() > COMPETITOR_SLOTS {
        tracing::warn!(
            competitors = analytics.competitors.len(),
            slots = COMPETITOR_SLOTS,
            "more competitors than template slots; extra channels are not shown"
        );
    }
    for (prefix, competitor) in channel_prefixes().skip(1).zip(
        analytics
            .competitors
            .iter()
            .map(Some)
            .chain(std::iter::repeat(None)),
    ) {
        out.channel(&prefix, analytics.days, competitor);
    }

    out.set("comparative_overview", narrative.overview.as_str());
    out.set("comparative_trends", bullets(&narrative.trends));
    out.set("comparative_gaps", bullets(&narrative.gaps));
    out.set("top_performer", narrative.top_performer.as_str());
    out.set("top_performer_note", narrative.top_performer_note.as_str());

    for number in 1..=IDEA_SLOTS {
        out.idea(number, narrative.ideas.get(number - 1));
    }

    for number in 1..=TAKEAWAY_SLOTS {
        let value = narrative.takeaways.get(number - 1).cloned().unwrap_or_default();
        out.set(format!("takeaway{number}"), value);
    }

    out.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chanlens_core::{process_all, AnalyticsInput};
    use chrono::TimeZone;

    use super::*;

    fn analytics() -> AnalyticsOutput {
        let input = AnalyticsInput::from_json(
            r#"{
                "days": 30,
                "channel": {
                    "channel_id": "UCa", "channel_name": "Alpha", "subscriber_count": 1234567,
                    "period_videos": [
                        {"video_id": "a1", "title": "An extremely long video title that will not fit on one slide row",
                         "published_at": "2026-01-10T00:00:00Z", "views": 2000, "likes": 90, "comments": 10}
                    ],
                    "baseline_videos": []
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

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()
    }

    fn replacements() -> HashMap<String, String> {
        let analytics = analytics();
        let narrative = Narrative::fallback(&analytics);
        build_replacements(&analytics, &narrative, now()).into_iter().collect()
    }

    #[test]
    fn title_uses_month_and_channel() {
        assert_eq!(
            report_title("Alpha", now()),
            "Alpha YouTube Analytics Report — March 2026"
        );
        assert_eq!(report_title("", now()), "YouTube Analytics Report — March 2026");
    }

    #[test]
    fn title_slide_and_channel_stats() {
        let r = replacements();
        assert_eq!(r["title_date"], "March 2026  |  30-Day Analysis Window");
        assert_eq!(r["channel_subscribers"], "1,234,567");
        assert_eq!(r["channel_views"], "2,000");
        assert_eq!(r["channel_views_label"], "VIEWS (30D)");
        assert_eq!(r["channel_engagement"], "5.00%");
        assert_eq!(r["channel_v1_title"].chars().count(), 50);
        assert!(r["channel_v1_title"].ends_with("..."));
        assert_eq!(r["channel_v2_title"], "—");
        assert_eq!(r["channel_v2_views"], "");
    }

    #[test]
    fn unused_competitor_slots_are_blank() {
        let r = replacements();
        assert_eq!(r["comp1_name"], "Beta");
        assert_eq!(r["comp1_subscribers"], "N/A");
        assert_eq!(r["comp2_name"], "");
        assert_eq!(r["comp7_v5_engagement"], "");
        assert!(!r.contains_key("comp8_name"));
    }

    #[test]
    fn every_slot_is_emitted_once() {
        let analytics = analytics();
        let narrative = Narrative::fallback(&analytics);
        let pairs = build_replacements(&analytics, &narrative, now());
        let unique: HashMap<_, _> = pairs.iter().cloned().collect();
        assert_eq!(unique.len(), pairs.len());
        // 2 title + 8 channel blocks of 21 + 5 comparative + 5 ideas of 10 + 3 takeaways
        assert_eq!(pairs.len(), 2 + 8 * 21 + 5 + 5 * 10 + 3);
    }

    #[test]
    fn listed_keys_match_what_is_rendered() {
        let analytics = analytics();
        let narrative = Narrative::fallback(&analytics);
        let rendered: Vec<String> = build_replacements(&analytics, &narrative, now())
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        let keys = placeholder_keys();
        assert_eq!(keys, rendered);
        assert_eq!(keys.first().map(String::as_str), Some("title_date"));
        assert!(keys.contains(&"comp7_v5_engagement".to_string()));
        assert!(keys.contains(&"idea5_hook2".to_string()));
        assert_eq!(keys.last().map(String::as_str), Some("takeaway3"));
    }

    #[test]
    fn ideas_and_takeaways_fill_their_slots() {
        let r = replacements();
        assert_eq!(r["idea1_number"], "1");
        assert_eq!(r["idea5_number"], "5");
        assert!(r["idea1_title"].starts_with("Inspired by: An extremely long"));
        assert_eq!(r["idea1_topic"], "Topic: Based on Alpha's outlier (0.00x)");
        assert_eq!(
            r["idea2_tv1"],
            "1. AI-generated ideas will appear here once AI insights are enabled"
        );
        assert!(!r["takeaway3"].is_empty());
    }

    #[test]
    fn bullets_cap_at_three_and_mark_empty() {
        let items: Vec<String> = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();
        assert_eq!(bullets(&items), "• a\n\n• b\n\n• c");
        assert_eq!(bullets(&[]), "• No data available");
    }

    #[test]
    fn idea_with_blank_fields_renders_empty_slots() {
        let mut r = Replacements(Vec::new());
        let idea = VideoIdea {
            title: String::new(),
            title_variations: vec!["Only one".to_string()],
            hooks: vec![],
            topic: String::new(),
        };
        r.idea(2, Some(&idea));
        let map: HashMap<_, _> = r.0.into_iter().collect();
        assert_eq!(map["idea2_title"], "Video Idea #2");
        assert_eq!(map["idea2_tv1"], "1. Only one");
        assert_eq!(map["idea2_tv2"], "");
        assert_eq!(map["idea2_hook1"], "");
        assert_eq!(map["idea2_topic"], "");
    }
}
