use thiserror::Error;

/// Errors returned by the insights client.
#[derive(Debug, Error)]
pub enum InsightsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Messages API answered with a non-2xx status.
    #[error("Anthropic API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The reply carried no text block.
    #[error("empty response from model for {0}")]
    EmptyResponse(String),

    /// The model's reply was not the JSON shape requested.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
