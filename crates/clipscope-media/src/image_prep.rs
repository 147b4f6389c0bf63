//! Image preparation for model requests.
//!
//! Remote images are fetched, fitted into a bounding box without upscaling,
//! re-encoded as JPEG and base64 encoded so they can be inlined into a
//! generation request.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;

use clipscope_models::PreparedImage;

use crate::error::{MediaError, MediaResult};

/// Desktop browser user agent; some image CDNs reject default HTTP clients.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Image preparation settings.
#[derive(Debug, Clone)]
pub struct ImagePrepConfig {
    /// Fetch timeout
    pub timeout: Duration,
    /// Images are fitted into a square box of this size
    pub max_dimension: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    pub user_agent: String,
}

impl Default for ImagePrepConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_dimension: 800,
            jpeg_quality: 80,
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

/// Turns an image URL into a model-ready payload.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, image_url: &str) -> MediaResult<PreparedImage>;
}

/// Fetches and transcodes remote images.
pub struct ImagePreparer {
    http: Client,
    config: ImagePrepConfig,
}

impl ImagePreparer {
    pub fn new(config: ImagePrepConfig) -> MediaResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Fetch an image and return it as base64 JPEG.
    ///
    /// Errors are local to this image; callers decide whether to skip it.
    pub async fn prepare(&self, image_url: &str) -> MediaResult<PreparedImage> {
        let response = self
            .http
            .get(image_url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| MediaError::fetch_failed(image_url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::HttpStatus {
                url: image_url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::fetch_failed(image_url, e.to_string()))?;

        debug!(url = %image_url, bytes = bytes.len(), "Fetched image");

        let max_dimension = self.config.max_dimension;
        let quality = self.config.jpeg_quality;
        tokio::task::spawn_blocking(move || transcode(&bytes, max_dimension, quality))
            .await
            .map_err(|e| MediaError::internal(format!("Transcode task failed: {}", e)))?
    }
}

#[async_trait]
impl ImageLoader for ImagePreparer {
    async fn load(&self, image_url: &str) -> MediaResult<PreparedImage> {
        self.prepare(image_url).await
    }
}

/// Decode, fit into `max_dimension`² (never upscaling), and encode as base64 JPEG.
pub fn transcode(bytes: &[u8], max_dimension: u32, quality: u8) -> MediaResult<PreparedImage> {
    let img = image::load_from_memory(bytes)?;

    let img = if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality).encode_image(&rgb)?;

    Ok(PreparedImage::jpeg(STANDARD.encode(&encoded)))
}
