//! Video metadata resolution.
//!
//! Metadata comes from an ordered list of [`MetadataStrategy`] objects. The
//! first strategy that returns metadata wins; errors are logged and the next
//! strategy is tried. There is no retry within or between strategies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use clipscope_models::{MetadataSource, VideoMetadata};

use crate::error::{PipelineError, PipelineResult};

/// One way of resolving a video reference into metadata.
#[async_trait]
pub trait MetadataStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the strategy ran but produced nothing.
    async fn attempt(&self, url: &str) -> PipelineResult<Option<VideoMetadata>>;
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    author_unique_id: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Unauthenticated public embed endpoint.
///
/// Yields a cover image, author and title, never a downloadable video URL.
pub struct EmbedStrategy {
    http: Client,
    base_url: String,
}

impl EmbedStrategy {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PipelineResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl MetadataStrategy for EmbedStrategy {
    fn name(&self) -> &'static str {
        "embed"
    }

    async fn attempt(&self, url: &str) -> PipelineResult<Option<VideoMetadata>> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("url", url)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::video_resolution(format!(
                "embed endpoint returned {}",
                response.status()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::video_resolution(format!("invalid embed response: {}", e)))?;

        let author = body
            .author_unique_id
            .filter(|a| !a.trim().is_empty())
            .or(body.author_name)
            .unwrap_or_default();

        let mut metadata = VideoMetadata::new(url, MetadataSource::Embed)
            .with_author(author)
            .with_description(body.title.unwrap_or_default());
        metadata.cover_image_url = body.thumbnail_url.filter(|u| !u.trim().is_empty());

        Ok(Some(metadata))
    }
}

/// Runs the metadata strategy chain.
pub struct VideoResolver {
    strategies: Vec<Box<dyn MetadataStrategy>>,
}

impl VideoResolver {
    pub fn new(strategies: Vec<Box<dyn MetadataStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve a video page URL, or fail with [`PipelineError::VideoResolution`]
    /// when every strategy failed.
    pub async fn resolve(&self, url: &str) -> PipelineResult<VideoMetadata> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            match strategy.attempt(url).await {
                Ok(Some(metadata)) => {
                    info!(
                        strategy = strategy.name(),
                        has_video_url = metadata.video_url().is_some(),
                        has_cover = metadata.has_cover(),
                        "Video resolved"
                    );
                    return Ok(metadata);
                }
                Ok(None) => {
                    debug!(strategy = strategy.name(), url, "Metadata strategy produced nothing");
                    failures.push(format!("{}: no result", strategy.name()));
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), url, error = %e, "Metadata strategy failed");
                    failures.push(format!("{}: {}", strategy.name(), e));
                }
            }
        }

        Err(PipelineError::video_resolution(if failures.is_empty() {
            "no metadata strategies configured".to_string()
        } else {
            failures.join("; ")
        }))
    }
}
