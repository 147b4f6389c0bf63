//! Pipeline configuration.

use std::time::Duration;

use clipscope_media::{ImagePrepConfig, PollPolicy, DEFAULT_THUMBNAIL_PROXY_URL};
use clipscope_models::DEFAULT_BATCH_COUNT;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scraping service credential; scraper metadata and batch discovery are
    /// disabled without it
    pub scraper_api_key: Option<String>,
    pub scraper_base_url: String,
    /// Public embed metadata endpoint
    pub embed_base_url: String,
    /// Render service credential; rendered frames are disabled without it
    pub render_api_key: Option<String>,
    pub render_base_url: String,
    pub thumbnail_proxy_url: String,
    pub render_poll_interval: Duration,
    pub render_poll_max_attempts: u32,
    pub scraper_timeout: Duration,
    pub image_fetch_timeout: Duration,
    pub image_max_dimension: u32,
    pub image_jpeg_quality: u8,
    /// Videos analyzed per keyword when the caller gives no count
    pub batch_default_count: u32,
    /// Maximum batch items in flight
    pub max_batch_parallel: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scraper_api_key: None,
            scraper_base_url: "https://api.apify.com/v2/acts/clockworks~tiktok-scraper".to_string(),
            embed_base_url: "https://www.tiktok.com/oembed".to_string(),
            render_api_key: None,
            render_base_url: "https://api.shotstack.io/edit/stage".to_string(),
            thumbnail_proxy_url: DEFAULT_THUMBNAIL_PROXY_URL.to_string(),
            render_poll_interval: Duration::from_secs(2),
            render_poll_max_attempts: 30,
            scraper_timeout: Duration::from_secs(60),
            image_fetch_timeout: Duration::from_secs(30),
            image_max_dimension: 800,
            image_jpeg_quality: 80,
            batch_default_count: DEFAULT_BATCH_COUNT,
            max_batch_parallel: 4,
        }
    }
}

fn env_secret(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            scraper_api_key: env_secret("SCRAPER_API_KEY"),
            scraper_base_url: std::env::var("SCRAPER_BASE_URL").unwrap_or(defaults.scraper_base_url),
            embed_base_url: std::env::var("EMBED_BASE_URL").unwrap_or(defaults.embed_base_url),
            render_api_key: env_secret("RENDER_API_KEY"),
            render_base_url: std::env::var("RENDER_BASE_URL").unwrap_or(defaults.render_base_url),
            thumbnail_proxy_url: std::env::var("THUMBNAIL_PROXY_URL")
                .unwrap_or(defaults.thumbnail_proxy_url),
            render_poll_interval: Duration::from_secs(
                std::env::var("RENDER_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            render_poll_max_attempts: std::env::var("RENDER_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(30),
            scraper_timeout: Duration::from_secs(
                std::env::var("SCRAPER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            image_fetch_timeout: Duration::from_secs(
                std::env::var("IMAGE_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            image_max_dimension: std::env::var("IMAGE_MAX_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(800),
            image_jpeg_quality: std::env::var("IMAGE_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|q| (1..=100).contains(q))
                .unwrap_or(80),
            batch_default_count: std::env::var("BATCH_DEFAULT_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BATCH_COUNT),
            max_batch_parallel: std::env::var("MAX_BATCH_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(4),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.render_poll_interval,
            max_attempts: self.render_poll_max_attempts,
        }
    }

    pub fn image_prep(&self) -> ImagePrepConfig {
        ImagePrepConfig {
            timeout: self.image_fetch_timeout,
            max_dimension: self.image_max_dimension,
            jpeg_quality: self.image_jpeg_quality,
            ..ImagePrepConfig::default()
        }
    }

    pub fn scraper_enabled(&self) -> bool {
        self.scraper_api_key.is_some()
    }

    pub fn render_enabled(&self) -> bool {
        self.render_api_key.is_some()
    }
}
