//! Pipeline error types.

use thiserror::Error;

use clipscope_media::MediaError;
use clipscope_ml_client::MlError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every metadata strategy failed for the reference.
    #[error("Could not resolve video: {0}")]
    VideoResolution(String),

    /// Nothing usable to send to the model.
    #[error("No valid images to analyze")]
    NoValidImages,

    #[error("Model provider quota exceeded: {0}")]
    ProviderQuota(String),

    #[error("Model error: {0}")]
    Model(MlError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Keyword search needs the scraping service credential.
    #[error("Keyword discovery is not configured")]
    DiscoveryUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<MlError> for PipelineError {
    fn from(err: MlError) -> Self {
        if err.is_quota() {
            Self::ProviderQuota(err.to_string())
        } else {
            Self::Model(err)
        }
    }
}

impl PipelineError {
    pub fn video_resolution(msg: impl Into<String>) -> Self {
        Self::VideoResolution(msg.into())
    }

    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, PipelineError::ProviderQuota(_))
    }

    /// Stable machine-readable kind, used in batch item errors and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::VideoResolution(_) => "video_resolution",
            PipelineError::NoValidImages => "no_valid_images",
            PipelineError::ProviderQuota(_) => "provider_quota",
            PipelineError::Model(_) => "model",
            PipelineError::Media(_) => "media",
            PipelineError::Discovery(_) => "discovery",
            PipelineError::DiscoveryUnavailable => "discovery_unavailable",
            PipelineError::Config(_) => "config",
            PipelineError::Network(_) => "network",
        }
    }

    /// Caller-facing message.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::VideoResolution(_) => {
                "We couldn't load that video. Check the link or try a different video.".to_string()
            }
            PipelineError::NoValidImages => {
                "We couldn't get any usable images from that video. Try a different video.".to_string()
            }
            PipelineError::ProviderQuota(_) => {
                "The analysis service is at capacity right now. Please try again later.".to_string()
            }
            PipelineError::DiscoveryUnavailable => {
                "Keyword search is not available. Paste a direct video link instead.".to_string()
            }
            PipelineError::Discovery(_) => {
                "Searching for videos failed. Try another keyword or paste a video link.".to_string()
            }
            _ => "Analysis failed. Please try again.".to_string(),
        }
    }
}
