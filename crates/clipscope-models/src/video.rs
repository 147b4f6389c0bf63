//! Video metadata models.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which resolution strategy produced a [`VideoMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// Key-gated scraping service (full metadata)
    Scraper,
    /// Public embed endpoint (cover, author and title only)
    #[default]
    Embed,
}

impl MetadataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataSource::Scraper => "scraper",
            MetadataSource::Embed => "embed",
        }
    }
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved facts about one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Public page URL of the video
    pub source_url: String,

    /// Downloadable media URL (only known when the scraper succeeded)
    #[serde(default)]
    pub direct_video_url: Option<String>,

    #[serde(default)]
    pub cover_image_url: Option<String>,

    #[serde(default)]
    pub author_handle: String,

    /// Caption / title text
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub view_count: u64,

    #[serde(default)]
    pub like_count: u64,

    #[serde(default)]
    pub comment_count: u64,

    #[serde(default)]
    pub share_count: u64,

    #[serde(default)]
    pub duration_secs: Option<f64>,

    #[serde(default)]
    pub source: MetadataSource,
}

impl VideoMetadata {
    /// Create metadata with only the source URL set.
    pub fn new(source_url: impl Into<String>, source: MetadataSource) -> Self {
        Self {
            source_url: source_url.into(),
            direct_video_url: None,
            cover_image_url: None,
            author_handle: String::new(),
            description: String::new(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
            duration_secs: None,
            source,
        }
    }

    pub fn with_direct_video_url(mut self, url: impl Into<String>) -> Self {
        self.direct_video_url = Some(url.into());
        self
    }

    pub fn with_cover_image_url(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = Some(url.into());
        self
    }

    pub fn with_author(mut self, handle: impl Into<String>) -> Self {
        self.author_handle = handle.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether a cover image is available for the degradation path.
    pub fn has_cover(&self) -> bool {
        self.cover_image_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }

    /// Direct video URL, ignoring blank values.
    pub fn video_url(&self) -> Option<&str> {
        self.direct_video_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }
}
