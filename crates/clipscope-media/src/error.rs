//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while extracting frames or preparing images.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Render submission failed: {0}")]
    RenderSubmit(String),

    #[error("Render status check failed: {0}")]
    RenderStatus(String),

    /// Every frame strategy produced nothing. Callers degrade instead of failing.
    #[error("No frames could be extracted")]
    FrameExtractionExhausted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a fetch failure error.
    pub fn fetch_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, MediaError::FrameExtractionExhausted)
    }
}
