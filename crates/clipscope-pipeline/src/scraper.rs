//! Scraping service client.
//!
//! The scraper is the only collaborator that yields a downloadable video URL,
//! and the only one that can search by keyword. Both uses share one
//! synchronous "run and return dataset items" endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use clipscope_models::{MetadataSource, VideoMetadata};

use crate::error::{PipelineError, PipelineResult};
use crate::resolver::MetadataStrategy;

/// One item found by keyword discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCandidate {
    pub source_url: String,
    /// Metadata mapped from the search record, when it was usable
    pub metadata: Option<VideoMetadata>,
}

impl VideoCandidate {
    pub fn from_url(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            metadata: None,
        }
    }
}

/// Finds videos for a keyword.
#[async_trait]
pub trait VideoDiscovery: Send + Sync {
    async fn discover(&self, keyword: &str, count: u32) -> PipelineResult<Vec<VideoCandidate>>;
}

/// Scraping service configuration.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub api_key: String,
    /// Actor base URL; `/run-sync-get-dataset-items` is appended
    pub base_url: String,
    pub timeout: Duration,
}

/// Raw dataset record. Every field is optional; the service omits what it
/// could not collect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperRecord {
    pub web_video_url: Option<String>,
    pub text: Option<String>,
    pub play_count: Option<u64>,
    pub digg_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub share_count: Option<u64>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub covers: Vec<String>,
    pub author_meta: Option<AuthorMeta>,
    pub video_meta: Option<VideoMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorMeta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMeta {
    pub download_addr: Option<String>,
    pub cover_url: Option<String>,
    pub duration: Option<f64>,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

impl ScraperRecord {
    /// Map the record onto [`VideoMetadata`]; `fallback_url` is used when the
    /// record does not carry its own page URL.
    pub fn into_metadata(self, fallback_url: &str) -> VideoMetadata {
        let video_meta = self.video_meta.unwrap_or_default();

        let source_url = non_blank(self.web_video_url.as_ref()).unwrap_or_else(|| fallback_url.to_string());
        let direct = non_blank(video_meta.download_addr.as_ref()).or_else(|| non_blank(self.media_urls.first()));
        let cover = non_blank(video_meta.cover_url.as_ref()).or_else(|| non_blank(self.covers.first()));

        let mut metadata = VideoMetadata::new(source_url, MetadataSource::Scraper)
            .with_author(self.author_meta.and_then(|a| a.name).unwrap_or_default())
            .with_description(self.text.unwrap_or_default());
        metadata.direct_video_url = direct;
        metadata.cover_image_url = cover;
        metadata.view_count = self.play_count.unwrap_or(0);
        metadata.like_count = self.digg_count.unwrap_or(0);
        metadata.comment_count = self.comment_count.unwrap_or(0);
        metadata.share_count = self.share_count.unwrap_or(0);
        metadata.duration_secs = video_meta.duration.filter(|d| *d > 0.0);
        metadata
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    #[serde(rename = "postURLs", skip_serializing_if = "Vec::is_empty")]
    post_urls: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    search_queries: Vec<&'a str>,
    results_per_page: u32,
    should_download_videos: bool,
    should_download_covers: bool,
}

/// HTTP client for the scraping service.
pub struct ScraperClient {
    http: Client,
    config: ScraperConfig,
}

impl ScraperClient {
    pub fn new(config: ScraperConfig) -> PipelineResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(PipelineError::config("scraper API key is empty"));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    async fn run(&self, request: &ScrapeRequest<'_>) -> PipelineResult<Vec<ScraperRecord>> {
        let endpoint = format!(
            "{}/run-sync-get-dataset-items",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(endpoint)
            .query(&[("token", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::discovery(format!(
                "scraper returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let records: Vec<ScraperRecord> = response
            .json()
            .await
            .map_err(|e| PipelineError::discovery(format!("invalid scraper response: {}", e)))?;
        debug!(records = records.len(), "Scraper run finished");
        Ok(records)
    }

    /// Fetch metadata for one video page URL.
    pub async fn fetch_video(&self, url: &str) -> PipelineResult<Option<VideoMetadata>> {
        let request = ScrapeRequest {
            post_urls: vec![url],
            search_queries: Vec::new(),
            results_per_page: 1,
            should_download_videos: false,
            should_download_covers: false,
        };
        let records = self.run(&request).await?;
        // Error records (e.g. a removed post) carry neither cover nor media.
        Ok(records
            .into_iter()
            .next()
            .map(|r| r.into_metadata(url))
            .filter(|m| m.has_cover() || m.video_url().is_some()))
    }
}

#[async_trait]
impl VideoDiscovery for ScraperClient {
    async fn discover(&self, keyword: &str, count: u32) -> PipelineResult<Vec<VideoCandidate>> {
        let request = ScrapeRequest {
            post_urls: Vec::new(),
            search_queries: vec![keyword],
            results_per_page: count,
            should_download_videos: false,
            should_download_covers: false,
        };
        let records = self.run(&request).await?;

        let candidates: Vec<VideoCandidate> = records
            .into_iter()
            .filter_map(|record| {
                let url = non_blank(record.web_video_url.as_ref())?;
                let metadata = record.into_metadata(&url);
                // Records without a cover or media URL are re-resolved individually.
                let usable = metadata.has_cover() || metadata.video_url().is_some();
                Some(VideoCandidate {
                    source_url: url,
                    metadata: usable.then_some(metadata),
                })
            })
            .take(count as usize)
            .collect();

        info!(keyword, requested = count, found = candidates.len(), "Discovery finished");
        Ok(candidates)
    }
}

/// Metadata strategy backed by the scraping service.
pub struct ScraperStrategy {
    client: Arc<ScraperClient>,
}

impl ScraperStrategy {
    pub fn new(client: Arc<ScraperClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataStrategy for ScraperStrategy {
    fn name(&self) -> &'static str {
        "scraper"
    }

    async fn attempt(&self, url: &str) -> PipelineResult<Option<VideoMetadata>> {
        self.client.fetch_video(url).await
    }
}
