//! Analysis orchestration.
//!
//! Single mode: resolve → extract frames → prepare images → vision →
//! structure. Whenever frames cannot be used the analysis degrades to the
//! cover image instead of failing. Batch mode runs the single pipeline for
//! every discovered candidate with bounded parallelism, isolating failures
//! per item.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{debug, Instrument};

use clipscope_media::{
    FrameExtractor, FrameStrategy, ImageLoader, ImagePreparer, RenderClient, RenderClientConfig,
    RenderFrameStrategy, ThumbnailProxyStrategy, VideoSource,
};
use clipscope_ml_client::GenerativeModel;
use clipscope_models::{
    AnalysisEnvelope, AnalysisMode, AnalysisResult, BatchItemError, FrameSet, FrameSource,
    PreparedImage, VideoMetadata, VideoOutcome, VideoReference,
};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::AnalysisLogger;
use crate::metrics::{record_analysis, record_degraded};
use crate::resolver::{EmbedStrategy, MetadataStrategy, VideoResolver};
use crate::scraper::{ScraperClient, ScraperConfig, ScraperStrategy, VideoCandidate, VideoDiscovery};
use crate::structurer::structure;
use crate::vision::{usable_images, VisionAnalyzer};

/// Why an analysis fell back to the cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    NoVideoUrl,
    ExtractionExhausted,
    FramePreparationFailed,
}

impl DegradeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradeReason::NoVideoUrl => "no_video_url",
            DegradeReason::ExtractionExhausted => "extraction_exhausted",
            DegradeReason::FramePreparationFailed => "frame_preparation_failed",
        }
    }
}

/// Runs single and batch analyses.
pub struct Orchestrator {
    resolver: VideoResolver,
    extractor: FrameExtractor,
    images: Arc<dyn ImageLoader>,
    vision: VisionAnalyzer,
    discovery: Option<Arc<dyn VideoDiscovery>>,
    max_batch_parallel: usize,
    batch_default_count: u32,
}

impl Orchestrator {
    pub fn new(
        resolver: VideoResolver,
        extractor: FrameExtractor,
        images: Arc<dyn ImageLoader>,
        vision: VisionAnalyzer,
    ) -> Self {
        Self {
            resolver,
            extractor,
            images,
            vision,
            discovery: None,
            max_batch_parallel: 4,
            batch_default_count: clipscope_models::DEFAULT_BATCH_COUNT,
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn VideoDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn with_batch_parallelism(mut self, max_in_flight: usize) -> Self {
        self.max_batch_parallel = max_in_flight.max(1);
        self
    }

    /// Result count for keyword searches that do not name one.
    pub fn with_batch_default_count(mut self, count: u32) -> Self {
        self.batch_default_count = clipscope_models::clamp_batch_count(count);
        self
    }

    /// Wire the production collaborators. Optional credentials switch
    /// strategies on: the scraper key enables scraper metadata and batch
    /// discovery, the render key enables rendered frames.
    pub fn from_config(config: &PipelineConfig, model: Arc<dyn GenerativeModel>) -> PipelineResult<Self> {
        let mut metadata_strategies: Vec<Box<dyn MetadataStrategy>> = Vec::new();
        let mut discovery: Option<Arc<dyn VideoDiscovery>> = None;

        if let Some(api_key) = &config.scraper_api_key {
            let client = Arc::new(ScraperClient::new(ScraperConfig {
                api_key: api_key.clone(),
                base_url: config.scraper_base_url.clone(),
                timeout: config.scraper_timeout,
            })?);
            metadata_strategies.push(Box::new(ScraperStrategy::new(client.clone())));
            discovery = Some(client as Arc<dyn VideoDiscovery>);
        }
        metadata_strategies.push(Box::new(EmbedStrategy::new(
            config.embed_base_url.clone(),
            Duration::from_secs(15),
        )?));

        let mut frame_strategies: Vec<Box<dyn FrameStrategy>> = Vec::new();
        if let Some(api_key) = &config.render_api_key {
            let client = RenderClient::new(RenderClientConfig::new(api_key.clone(), config.render_base_url.clone()))?;
            frame_strategies.push(Box::new(RenderFrameStrategy::new(Arc::new(client), config.poll_policy())));
        }
        frame_strategies.push(Box::new(ThumbnailProxyStrategy::new(config.thumbnail_proxy_url.clone())));

        let images = Arc::new(ImagePreparer::new(config.image_prep())?);

        let mut orchestrator = Self::new(
            VideoResolver::new(metadata_strategies),
            FrameExtractor::new(frame_strategies),
            images,
            VisionAnalyzer::new(model),
        )
        .with_batch_parallelism(config.max_batch_parallel)
        .with_batch_default_count(config.batch_default_count);
        orchestrator.discovery = discovery;
        Ok(orchestrator)
    }

    pub fn metadata_strategies(&self) -> Vec<&'static str> {
        self.resolver.strategy_names()
    }

    pub fn frame_strategies(&self) -> Vec<&'static str> {
        self.extractor.strategy_names()
    }

    pub fn discovery_enabled(&self) -> bool {
        self.discovery.is_some()
    }

    /// Analyze a classified reference. Single-mode failures are returned as
    /// errors; batch items fail individually inside the envelope.
    pub async fn analyze(&self, reference: &VideoReference, logger: &AnalysisLogger) -> PipelineResult<AnalysisEnvelope> {
        let started = Instant::now();
        let mode = reference.mode.as_str();

        let result = match reference.mode {
            AnalysisMode::Single => self
                .analyze_single(&reference.raw, logger)
                .await
                .map(|r| AnalysisEnvelope::new(AnalysisMode::Single, vec![VideoOutcome::success(r)])),
            AnalysisMode::Batch => {
                let count = reference.count.unwrap_or(self.batch_default_count);
                self.analyze_batch(&reference.raw, count, logger).await
            }
        };

        let outcome = match &result {
            Ok(envelope) if envelope.failed == 0 => "success",
            Ok(_) => "partial",
            Err(e) if e.is_quota_exceeded() => "quota",
            Err(_) => "error",
        };
        record_analysis(mode, outcome, started.elapsed().as_secs_f64());
        result
    }

    /// Analyze one video page URL.
    pub async fn analyze_single(&self, url: &str, logger: &AnalysisLogger) -> PipelineResult<AnalysisResult> {
        logger.log_start(url);
        let metadata = match self.resolver.resolve(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                logger.log_error(&e.to_string());
                return Err(e);
            }
        };

        let result = self.analyze_metadata(metadata, logger).await;
        match &result {
            Ok(analysis) => logger.log_completion(&format!(
                "frame_source={} frames={} score={}",
                analysis.frame_source.as_str(),
                analysis.frames_analyzed,
                analysis.structured.replication_score
            )),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    /// Analyze already-resolved metadata.
    pub async fn analyze_metadata(&self, metadata: VideoMetadata, logger: &AnalysisLogger) -> PipelineResult<AnalysisResult> {
        let video_source = metadata
            .video_url()
            .map(|url| VideoSource::new(url, metadata.duration_secs));

        let reason = match video_source {
            None => DegradeReason::NoVideoUrl,
            Some(source) => {
                match self.extractor.extract(&source).await {
                    Ok(frames) => {
                        logger.log_progress(&format!("{} {} frame(s)", frames.source.as_str(), frames.len()));
                        let images = usable_images(&self.prepare_frames(&frames).await);
                        if !images.is_empty() {
                            return self.run_vision(metadata, &images, frames.source).await;
                        }
                        DegradeReason::FramePreparationFailed
                    }
                    Err(e) => {
                        if !e.is_exhausted() {
                            logger.log_warning(&format!("frame extraction failed: {}", e));
                        }
                        DegradeReason::ExtractionExhausted
                    }
                }
            }
        };

        self.analyze_cover(metadata, reason, logger).await
    }

    async fn analyze_cover(
        &self,
        metadata: VideoMetadata,
        reason: DegradeReason,
        logger: &AnalysisLogger,
    ) -> PipelineResult<AnalysisResult> {
        logger.log_warning(&format!("falling back to cover image ({})", reason.as_str()));
        record_degraded(reason.as_str());

        let cover_url = match metadata.cover_image_url.as_deref() {
            Some(url) if metadata.has_cover() => url.to_string(),
            _ => return Err(PipelineError::NoValidImages),
        };

        let cover = self.images.load(&cover_url).await.map_err(|e| {
            logger.log_warning(&format!("cover image unusable: {}", e));
            PipelineError::NoValidImages
        })?;

        self.run_vision(metadata, &[cover], FrameSource::Cover).await
    }

    async fn run_vision(
        &self,
        metadata: VideoMetadata,
        images: &[PreparedImage],
        source: FrameSource,
    ) -> PipelineResult<AnalysisResult> {
        let raw_text = self.vision.analyze(&metadata, images).await?;
        let structured = structure(&raw_text);
        Ok(AnalysisResult::new(metadata, raw_text, structured, source, images.len()))
    }

    /// Fetch every frame concurrently; failures are logged and skipped.
    async fn prepare_frames(&self, frames: &FrameSet) -> Vec<PreparedImage> {
        let results = join_all(frames.frames.iter().map(|frame| async move {
            (frame.offset, self.images.load(&frame.image_url).await)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(offset, result)| match result {
                Ok(image) => Some(image),
                Err(e) => {
                    debug!(offset = ?offset, error = %e, "Frame preparation failed");
                    None
                }
            })
            .collect()
    }

    /// Discover up to `count` videos for a keyword and analyze each.
    pub async fn analyze_batch(&self, keyword: &str, count: u32, logger: &AnalysisLogger) -> PipelineResult<AnalysisEnvelope> {
        let discovery = self.discovery.as_ref().ok_or(PipelineError::DiscoveryUnavailable)?;

        logger.log_start(&format!("keyword={:?} count={}", keyword, count));
        let candidates = discovery.discover(keyword, count).await?;
        logger.log_progress(&format!("{} candidate(s) discovered", candidates.len()));

        let results: Vec<VideoOutcome> = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| {
                let item_logger = logger.child("analyze_item");
                let span = item_logger.create_span();
                async move { self.analyze_candidate(index, candidate, &item_logger).await }.instrument(span)
            })
            .buffered(self.max_batch_parallel)
            .collect()
            .await;

        let envelope = AnalysisEnvelope::new(AnalysisMode::Batch, results);
        logger.log_completion(&format!(
            "{} succeeded, {} failed",
            envelope.succeeded, envelope.failed
        ));
        Ok(envelope)
    }

    async fn analyze_candidate(&self, index: usize, candidate: VideoCandidate, logger: &AnalysisLogger) -> VideoOutcome {
        let source_url = candidate.source_url.clone();
        let result = match candidate.metadata {
            Some(metadata) => self.analyze_metadata(metadata, logger).await,
            None => self.analyze_single(&candidate.source_url, logger).await,
        };

        match result {
            Ok(analysis) => VideoOutcome::success(analysis),
            Err(e) => {
                logger.log_warning(&format!("item {} failed: {}", index, e));
                VideoOutcome::failure(BatchItemError {
                    index,
                    source_url: Some(source_url),
                    kind: e.kind().to_string(),
                    message: e.user_message(),
                })
            }
        }
    }
}
