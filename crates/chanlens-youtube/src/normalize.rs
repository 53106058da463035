//! Conversion of API wire types into chanlens records.

use std::sync::LazyLock;

use chanlens_core::Video;
use regex::Regex;

use crate::types::{ChannelItem, VideoItem};

/// Channel metadata resolved from a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub title: String,
    pub subscriber_count: Option<u64>,
    pub total_views: u64,
    /// `UU…` uploads playlist id.
    pub uploads_playlist_id: String,
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("valid duration regex")
});

/// Parse an ISO-8601 duration such as `PT12M34S` or `P1DT2H` into seconds.
///
/// Returns 0 for anything that does not match `P[nD][T[nH][nM][nS]]`.
#[must_use]
pub fn parse_iso8601_duration(duration: &str) -> u64 {
    let Some(caps) = DURATION_RE.captures(duration) else {
        return 0;
    };
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    part(1) * 86_400 + part(2) * 3_600 + part(3) * 60 + part(4)
}

/// Parse a statistics string; missing or malformed counts become 0.
#[must_use]
pub fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Rewrite a `UC…` channel-style id into the matching `UU…` uploads playlist id.
#[must_use]
pub fn uploads_playlist_id(raw: &str) -> String {
    match raw.strip_prefix("UC") {
        Some(rest) => format!("UU{rest}"),
        None => raw.to_string(),
    }
}

#[must_use]
pub fn channel_info(item: ChannelItem) -> ChannelInfo {
    let stats = &item.statistics;
    let subscriber_count = if stats.hidden_subscriber_count {
        None
    } else {
        stats
            .subscriber_count
            .as_deref()
            .and_then(|s| s.parse().ok())
    };

    ChannelInfo {
        total_views: parse_count(stats.view_count.as_deref()),
        subscriber_count,
        uploads_playlist_id: uploads_playlist_id(&item.content_details.related_playlists.uploads),
        channel_id: item.id,
        title: item.snippet.title,
    }
}

#[must_use]
pub fn video(item: VideoItem) -> Video {
    let stats = &item.statistics;
    Video {
        views: parse_count(stats.view_count.as_deref()),
        likes: parse_count(stats.like_count.as_deref()),
        comments: parse_count(stats.comment_count.as_deref()),
        duration_seconds: parse_iso8601_duration(&item.content_details.duration),
        video_id: item.id,
        title: item.snippet.title,
        published_at: item.snippet.published_at,
    }
}
