use thiserror::Error;

/// Errors returned while rendering a report deck.
#[derive(Debug, Error)]
pub enum SlidesError {
    #[error("GOOGLE_SLIDES_TEMPLATE_ID is not set; create the template deck first")]
    MissingTemplate,

    /// No authorized-user token was found in the environment or on disk.
    #[error("missing Google credentials: {0}")]
    MissingCredentials(String),

    /// The stored token is unusable and cannot be refreshed.
    #[error("Google auth failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Drive or Slides answered with a non-2xx status.
    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
