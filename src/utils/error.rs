//! Error handling for vodloader

use thiserror::Error;

/// Main error type for vodloader
///
/// Everything except `Configuration` is scoped to a single broadcast: the session
/// reports it and moves on to the next input.
#[derive(Debug, Error)]
pub enum VodError {
    #[error("empty input")]
    EmptyInput,

    #[error("invalid input: {0}")]
    InvalidInputFormat(String),

    #[error("TwitchApiError: {0}")]
    MetadataApi(String),

    #[error("no renditions available for this broadcast")]
    NoRenditionsAvailable,

    #[error("quality '{requested}' not available (available: {})", .available.join(", "))]
    QualityNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("Invalid config-file: {0}")]
    Configuration(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
