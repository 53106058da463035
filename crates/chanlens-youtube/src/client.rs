//! HTTP client for the YouTube Data API v3.
//!
//! Every API call goes through [`YoutubeClient::request`], which retries
//! transient failures and maps the API's error envelope onto
//! [`YoutubeError`]. Shorts detection uses a separate client that does not
//! follow redirects.

use std::time::Duration;

use chanlens_core::{ChannelData, ChannelRole, Video};
use chrono::Utc;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::normalize::{self, ChannelInfo};
use crate::retry::retry_with_backoff;
use crate::types::{ChannelItem, ErrorEnvelope, ListResponse, PlaylistItem, VideoItem};

const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const DEFAULT_SHORTS_BASE_URL: &str = "https://www.youtube.com/shorts/";
const PAGE_SIZE: usize = 50;
/// Shorts are at most three minutes long; anything longer is long-form.
const SHORTS_MAX_SECONDS: u64 = 180;

/// Tuning knobs for [`YoutubeClient::fetch_channel_data`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Pause after each Shorts check.
    pub shorts_check_delay_ms: u64,
    /// Long-form baseline videos kept per channel.
    pub baseline_size: usize,
    /// Upload ids requested for the baseline before Shorts are filtered out.
    pub baseline_fetch_limit: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff_base_ms: 2_000,
            shorts_check_delay_ms: 300,
            baseline_size: 50,
            baseline_fetch_limit: 100,
        }
    }
}

/// Client for the YouTube Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_urls`] to point at mock servers in tests.
pub struct YoutubeClient {
    client: Client,
    shorts_client: Client,
    api_key: String,
    api_base: Url,
    shorts_base: Url,
    options: FetchOptions,
}

fn parse_base_url(raw: &str) -> Result<Url, YoutubeError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest` client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, YoutubeError> {
        Self::with_base_urls(
            api_key,
            timeout_secs,
            DEFAULT_API_BASE_URL,
            DEFAULT_SHORTS_BASE_URL,
        )
    }

    /// Creates a client with custom API and Shorts base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if a `reqwest` client cannot be built,
    /// or [`YoutubeError::InvalidBaseUrl`] if either URL does not parse.
    pub fn with_base_urls(
        api_key: &str,
        timeout_secs: u64,
        api_base: &str,
        shorts_base: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chanlens/0.1 (competitor-analytics)")
            .build()?;

        let shorts_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(Policy::none())
            .user_agent("chanlens/0.1 (competitor-analytics)")
            .build()?;

        Ok(Self {
            client,
            shorts_client,
            api_key: api_key.to_owned(),
            api_base: parse_base_url(api_base)?,
            shorts_base: parse_base_url(shorts_base)?,
            options: FetchOptions::default(),
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Resolves an `@handle` to channel metadata.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::ChannelNotFound`] if no channel has this handle.
    /// - [`YoutubeError::QuotaExceeded`] once the daily quota is spent.
    /// - [`YoutubeError::Http`] / [`YoutubeError::Api`] on transport or API failure.
    pub async fn resolve_handle(&self, handle: &str) -> Result<ChannelInfo, YoutubeError> {
        let handle = handle.trim().trim_start_matches('@');
        let url = self.endpoint(
            "channels",
            &[("part", "id,snippet,statistics,contentDetails"), ("forHandle", handle)],
        );
        let response: ListResponse<ChannelItem> = self
            .request(&url, &format!("channels(forHandle={handle})"))
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(normalize::channel_info)
            .ok_or_else(|| YoutubeError::ChannelNotFound(handle.to_string()))
    }

    /// Lists upload ids from newest to oldest.
    ///
    /// Paging stops at the first video published more than `days` ago, or once
    /// `max_videos` ids are collected.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError`] if any page request fails.
    pub async fn recent_video_ids(
        &self,
        uploads_playlist_id: &str,
        days: Option<u32>,
        max_videos: Option<usize>,
    ) -> Result<Vec<String>, YoutubeError> {
        let cutoff = days.map(|d| Utc::now() - chrono::Duration::days(i64::from(d)));
        let page_size = PAGE_SIZE.to_string();
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "contentDetails"),
                ("playlistId", uploads_playlist_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }
            let url = self.endpoint("playlistItems", &params);
            let page: ListResponse<PlaylistItem> = self
                .request(&url, &format!("playlistItems(playlistId={uploads_playlist_id})"))
                .await?;

            for item in page.items {
                let details = item.content_details;
                if let (Some(cutoff), Some(published)) = (cutoff, details.video_published_at) {
                    // Uploads are newest first; everything after this is older.
                    if published < cutoff {
                        return Ok(ids);
                    }
                }
                ids.push(details.video_id);
                if max_videos.is_some_and(|max| ids.len() >= max) {
                    return Ok(ids);
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(ids),
            }
        }
    }

    /// Fetches snippet, statistics and duration for each id, 50 ids per request.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError`] if any batch request fails.
    pub async fn video_details(&self, video_ids: &[String]) -> Result<Vec<Video>, YoutubeError> {
        let mut videos = Vec::with_capacity(video_ids.len());
        for batch in video_ids.chunks(PAGE_SIZE) {
            let ids = batch.join(",");
            let url = self.endpoint(
                "videos",
                &[("part", "snippet,statistics,contentDetails"), ("id", &ids)],
            );
            let response: ListResponse<VideoItem> = self
                .request(&url, &format!("videos(count={})", batch.len()))
                .await?;
            videos.extend(response.items.into_iter().map(normalize::video));
        }
        Ok(videos)
    }

    /// Returns `true` when `/shorts/{id}` answers 200 without redirecting.
    ///
    /// Regular videos redirect to the watch page. Any failure counts as "not a Short".
    pub async fn is_short(&self, video_id: &str) -> bool {
        let Ok(url) = self.shorts_base.join(video_id) else {
            return false;
        };
        match self.shorts_client.head(url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(err) => {
                tracing::debug!(video_id, error = %err, "shorts check failed, treating as long-form");
                false
            }
        }
    }

    /// Drops Shorts, keeping the remaining videos in input order.
    ///
    /// Videos longer than three minutes are kept without a network check.
    pub async fn filter_shorts(&self, videos: Vec<Video>) -> Vec<Video> {
        let delay = Duration::from_millis(self.options.shorts_check_delay_ms);
        let mut kept = Vec::with_capacity(videos.len());
        let mut checked = 0usize;
        let mut shorts = 0usize;

        for video in videos {
            if video.duration_seconds > SHORTS_MAX_SECONDS {
                kept.push(video);
                continue;
            }
            checked += 1;
            if self.is_short(&video.video_id).await {
                shorts += 1;
            } else {
                kept.push(video);
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        if shorts > 0 {
            tracing::info!(shorts, checked, "filtered Shorts");
        }
        kept
    }

    /// Fetches everything the analytics engine needs for one channel.
    ///
    /// Period videos are the long-form uploads of the last `days` days; the
    /// baseline is the most recent long-form uploads, capped at
    /// [`FetchOptions::baseline_size`].
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError`] if handle resolution or any listing call fails.
    pub async fn fetch_channel_data(&self, handle: &str, days: u32) -> Result<ChannelData, YoutubeError> {
        let info = self.resolve_handle(handle).await?;
        tracing::debug!(handle, channel_id = %info.channel_id, "resolved handle");

        let period_ids = self
            .recent_video_ids(&info.uploads_playlist_id, Some(days), None)
            .await?;
        let period_videos = self.video_details(&period_ids).await?;
        let period_videos = self.filter_shorts(period_videos).await;

        let baseline_ids = self
            .recent_video_ids(
                &info.uploads_playlist_id,
                None,
                Some(self.options.baseline_fetch_limit),
            )
            .await?;
        let baseline_videos = self.video_details(&baseline_ids).await?;
        let mut baseline_videos = self.filter_shorts(baseline_videos).await;
        baseline_videos.truncate(self.options.baseline_size);

        Ok(ChannelData {
            channel_id: info.channel_id,
            channel_name: info.title,
            subscriber_count: info.subscriber_count,
            total_views: info.total_views,
            uploads_playlist_id: Some(info.uploads_playlist_id),
            role: ChannelRole::Competitor,
            period_videos,
            baseline_videos,
        })
    }

    /// Builds an API URL with the key and percent-encoded query parameters.
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// Sends a GET with retries and decodes the JSON body.
    async fn request<T: DeserializeOwned>(&self, url: &Url, context: &str) -> Result<T, YoutubeError> {
        retry_with_backoff(self.options.max_retries, self.options.backoff_base_ms, move || {
            self.get_json(url, context)
        })
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url, context: &str) -> Result<T, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|source| YoutubeError::Deserialize {
            context: context.to_string(),
            source,
        })
    }
}

/// Maps a non-2xx response body onto a [`YoutubeError`].
fn api_error(status: u16, body: &str) -> YoutubeError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return YoutubeError::Api {
            status,
            message: body.chars().take(200).collect(),
        };
    };
    let quota = envelope
        .error
        .errors
        .iter()
        .any(|e| e.reason == "quotaExceeded" || e.reason == "dailyLimitExceeded");
    if status == 403 && quota {
        YoutubeError::QuotaExceeded(envelope.error.message)
    } else {
        YoutubeError::Api {
            status,
            message: envelope.error.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> YoutubeClient {
        YoutubeClient::with_base_urls("test-key", 30, base_url, "https://shorts.test/shorts")
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_appends_path_and_key() {
        let client = test_client("https://api.test/youtube/v3");
        let url = client.endpoint("channels", &[("forHandle", "mkbhd")]);
        assert_eq!(
            url.as_str(),
            "https://api.test/youtube/v3/channels?forHandle=mkbhd&key=test-key"
        );
    }

    #[test]
    fn endpoint_encodes_special_characters() {
        let client = test_client("https://api.test/");
        let url = client.endpoint("videos", &[("id", "a,b")]);
        assert_eq!(url.as_str(), "https://api.test/videos?id=a%2Cb&key=test-key");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = YoutubeClient::with_base_urls("k", 30, "not a url", "https://shorts.test/");
        assert!(matches!(result, Err(YoutubeError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn quota_reason_maps_to_quota_exceeded() {
        let body = r#"{"error":{"code":403,"message":"quota","errors":[{"reason":"quotaExceeded"}]}}"#;
        assert!(matches!(api_error(403, body), YoutubeError::QuotaExceeded(_)));
    }

    #[test]
    fn other_errors_keep_status_and_message() {
        let body = r#"{"error":{"code":400,"message":"bad handle","errors":[{"reason":"invalid"}]}}"#;
        match api_error(400, body) {
            YoutubeError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad handle");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        assert!(matches!(
            api_error(502, "<html>bad gateway</html>"),
            YoutubeError::Api { status: 502, ref message } if message.contains("bad gateway")
        ));
    }
}
