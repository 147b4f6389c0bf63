//! Still-frame extraction.
//!
//! Frames are produced by an ordered chain of [`FrameStrategy`] objects. The
//! first strategy that yields a non-empty [`FrameSet`] wins.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use clipscope_models::{FrameOffset, FrameSet, FrameSource, RenderJob};

use crate::error::{MediaError, MediaResult};
use crate::render::poll::{poll_until_settled, Clock, PollPolicy, TokioClock};
use crate::render::RenderService;

/// Duration assumed when the source does not report one.
pub const DEFAULT_DURATION_SECS: f64 = 10.0;

/// Default public thumbnailing proxy prefix.
pub const DEFAULT_THUMBNAIL_PROXY_URL: &str = "https://image.thum.io/get/width/800/";

/// Counter of render jobs by outcome.
pub const RENDER_JOBS_METRIC: &str = "clipscope_render_jobs_total";

/// A video frames can be taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSource {
    pub url: String,
    pub duration_secs: Option<f64>,
}

impl VideoSource {
    pub fn new(url: impl Into<String>, duration_secs: Option<f64>) -> Self {
        Self {
            url: url.into(),
            duration_secs,
        }
    }

    /// Seek position for an offset.
    pub fn seek_secs(&self, offset: FrameOffset) -> f64 {
        let duration = self
            .duration_secs
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(DEFAULT_DURATION_SECS);
        offset.fraction() * duration
    }
}

/// One way of producing frames for a video.
#[async_trait]
pub trait FrameStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce frames; an empty set means this strategy had nothing.
    async fn attempt(&self, source: &VideoSource) -> FrameSet;
}

/// Renders one still per offset through the render service.
pub struct RenderFrameStrategy {
    service: Arc<dyn RenderService>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl RenderFrameStrategy {
    pub fn new(service: Arc<dyn RenderService>, policy: PollPolicy) -> Self {
        Self {
            service,
            clock: Arc::new(TokioClock),
            policy,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn render_offset(&self, source: &VideoSource, offset: FrameOffset) -> Option<String> {
        let trim = source.seek_secs(offset);
        let job_id = match self.service.submit(&source.url, trim).await {
            Ok(id) => id,
            Err(e) => {
                warn!(offset = ?offset, error = %e, "Render submission failed");
                metrics::counter!(RENDER_JOBS_METRIC, "outcome" => "submit_failed").increment(1);
                return None;
            }
        };

        let mut job = RenderJob::submitted(job_id, offset);
        let url = poll_until_settled(
            self.service.as_ref(),
            self.clock.as_ref(),
            &self.policy,
            &mut job,
        )
        .await;

        let outcome = if url.is_some() { "completed" } else { "unsettled" };
        metrics::counter!(RENDER_JOBS_METRIC, "outcome" => outcome).increment(1);
        debug!(job_id = %job.id, offset = ?offset, attempts = job.attempts, outcome, "Render job finished");
        url
    }
}

#[async_trait]
impl FrameStrategy for RenderFrameStrategy {
    fn name(&self) -> &'static str {
        "render"
    }

    async fn attempt(&self, source: &VideoSource) -> FrameSet {
        let results = join_all(
            FrameOffset::ALL
                .iter()
                .map(|&offset| async move { (offset, self.render_offset(source, offset).await) }),
        )
        .await;

        FrameSet::from_optional(FrameSource::Rendered, results)
    }
}

/// Points a generic thumbnailing proxy at the video with a time fragment.
///
/// The proxy does not honor the fragment reliably, so these frames are a
/// coarse approximation at best.
pub struct ThumbnailProxyStrategy {
    proxy_url: String,
}

impl ThumbnailProxyStrategy {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: proxy_url.into(),
        }
    }

    pub fn frame_url(&self, video_url: &str, offset: FrameOffset) -> String {
        format!("{}{}#t={}", self.proxy_url, video_url, offset.percent())
    }
}

impl Default for ThumbnailProxyStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_PROXY_URL)
    }
}

#[async_trait]
impl FrameStrategy for ThumbnailProxyStrategy {
    fn name(&self) -> &'static str {
        "thumbnail_proxy"
    }

    async fn attempt(&self, source: &VideoSource) -> FrameSet {
        if source.url.trim().is_empty() {
            return FrameSet::new(FrameSource::ThumbnailProxy);
        }
        let results = FrameOffset::ALL
            .iter()
            .map(|&offset| (offset, Some(self.frame_url(&source.url, offset))))
            .collect();
        FrameSet::from_optional(FrameSource::ThumbnailProxy, results)
    }
}

/// Runs the frame strategy chain.
pub struct FrameExtractor {
    strategies: Vec<Box<dyn FrameStrategy>>,
}

impl FrameExtractor {
    pub fn new(strategies: Vec<Box<dyn FrameStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract frames, or [`MediaError::FrameExtractionExhausted`] when no
    /// strategy produced any.
    pub async fn extract(&self, source: &VideoSource) -> MediaResult<FrameSet> {
        for strategy in &self.strategies {
            let frames = strategy.attempt(source).await;
            if frames.is_empty() {
                debug!(strategy = strategy.name(), "Frame strategy produced nothing");
                continue;
            }
            info!(
                strategy = strategy.name(),
                frames = frames.len(),
                "Frames extracted"
            );
            return Ok(frames);
        }
        Err(MediaError::FrameExtractionExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderObservation;
    use clipscope_models::RenderStatus;
    use std::sync::Mutex;
    use std::time::Duration;

    struct InstantClock;

    #[async_trait]
    impl Clock for InstantClock {
        async fn sleep(&self, _duration: Duration) {}
    }

    /// Job ids encode the trim; only the listed trims ever finish.
    struct FakeRender {
        finishing_trims: Vec<f64>,
        submitted: Mutex<Vec<f64>>,
    }

    impl FakeRender {
        fn new(finishing_trims: Vec<f64>) -> Self {
            Self {
                finishing_trims,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RenderService for FakeRender {
        async fn submit(&self, _video_url: &str, trim_secs: f64) -> MediaResult<String> {
            self.submitted.lock().unwrap().push(trim_secs);
            Ok(format!("{}", trim_secs))
        }

        async fn status(&self, job_id: &str) -> MediaResult<RenderObservation> {
            let trim: f64 = job_id.parse().unwrap();
            if self.finishing_trims.contains(&trim) {
                Ok(RenderObservation::new(
                    RenderStatus::Done,
                    Some(format!("https://cdn.example/{}.jpg", job_id)),
                ))
            } else {
                Ok(RenderObservation::new(RenderStatus::Rendering, None))
            }
        }
    }

    fn render_strategy(service: FakeRender) -> RenderFrameStrategy {
        RenderFrameStrategy::new(Arc::new(service), PollPolicy::default())
            .with_clock(Arc::new(InstantClock))
    }

    #[test]
    fn test_seek_defaults_to_ten_seconds() {
        let source = VideoSource::new("https://v.example/a.mp4", None);
        assert_eq!(source.seek_secs(FrameOffset::Middle), 5.0);
        assert_eq!(source.seek_secs(FrameOffset::End), 9.5);

        let source = VideoSource::new("https://v.example/a.mp4", Some(40.0));
        assert_eq!(source.seek_secs(FrameOffset::Middle), 20.0);
    }

    #[test]
    fn test_proxy_frame_url() {
        let proxy = ThumbnailProxyStrategy::default();
        assert_eq!(
            proxy.frame_url("https://v.example/a.mp4", FrameOffset::End),
            "https://image.thum.io/get/width/800/https://v.example/a.mp4#t=95"
        );
    }

    #[tokio::test]
    async fn test_render_all_offsets() {
        let strategy = render_strategy(FakeRender::new(vec![0.0, 5.0, 9.5]));
        let frames = strategy
            .attempt(&VideoSource::new("https://v.example/a.mp4", None))
            .await;

        assert_eq!(frames.len(), 3);
        assert_eq!(frames.source, FrameSource::Rendered);
        assert_eq!(frames.frames[0].offset, FrameOffset::Start);
        assert_eq!(frames.frames[2].offset, FrameOffset::End);
    }

    #[tokio::test]
    async fn test_render_partial_success_keeps_single_frame() {
        let strategy = render_strategy(FakeRender::new(vec![5.0]));
        let frames = strategy
            .attempt(&VideoSource::new("https://v.example/a.mp4", None))
            .await;

        assert_eq!(frames.len(), 1);
        assert_eq!(frames.frames[0].offset, FrameOffset::Middle);
        assert_eq!(frames.frames[0].image_url, "https://cdn.example/5.jpg");
    }

    #[tokio::test]
    async fn test_extractor_falls_back_to_proxy() {
        let extractor = FrameExtractor::new(vec![
            Box::new(render_strategy(FakeRender::new(vec![]))),
            Box::new(ThumbnailProxyStrategy::default()),
        ]);
        assert_eq!(extractor.strategy_names(), vec!["render", "thumbnail_proxy"]);

        let frames = extractor
            .extract(&VideoSource::new("https://v.example/a.mp4", Some(12.0)))
            .await
            .unwrap();
        assert_eq!(frames.source, FrameSource::ThumbnailProxy);
        assert_eq!(frames.len(), 3);
    }

    #[tokio::test]
    async fn test_extractor_exhausted() {
        let extractor = FrameExtractor::new(vec![Box::new(ThumbnailProxyStrategy::default())]);
        let err = extractor
            .extract(&VideoSource::new("  ", None))
            .await
            .unwrap_err();
        assert!(err.is_exhausted());
    }
}
