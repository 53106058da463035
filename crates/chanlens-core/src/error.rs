use thiserror::Error;

/// Errors raised while loading environment or file-based configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read channel set file {path}: {source}")]
    ChannelSetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse channel set file: {0}")]
    ChannelSetParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Errors raised when analytics inputs or artifacts cannot be read.
///
/// A record missing a required field (id, title, publish date, channel name)
/// is a caller contract violation and surfaces here instead of being defaulted.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed {context}: {source}")]
    Input {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
