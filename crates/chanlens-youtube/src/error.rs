use thiserror::Error;

/// Errors returned by the YouTube Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No channel matches the requested handle.
    #[error("channel not found for handle: @{0}")]
    ChannelNotFound(String),

    /// The daily API quota is spent; it resets at midnight Pacific Time.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The API answered with a non-2xx status.
    #[error("YouTube API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A configured base URL could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
