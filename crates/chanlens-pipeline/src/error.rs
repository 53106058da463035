use chanlens_core::ConfigError;
use thiserror::Error;

/// Failures that end a run. Per-competitor, insight and report failures are
/// reported as progress instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build {client} client: {message}")]
    Setup {
        client: &'static str,
        message: String,
    },

    #[error("After deduplication, only {remaining} unique competitors remain (need {min})")]
    TooFewUnique { remaining: usize, min: usize },

    #[error("Error fetching {handle}: {message}\nCannot continue without the primary channel.")]
    PrimaryFetch { handle: String, message: String },

    #[error("Only {fetched} competitors fetched successfully (need {min})")]
    TooFewFetched { fetched: usize, min: usize },

    #[error("invalid run id {0:?}: must be a single path segment")]
    InvalidRunId(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
