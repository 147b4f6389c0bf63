//! Vision analysis.
//!
//! Sends prepared images plus a fixed rubric prompt to the multimodal model
//! and returns its free-text answer unchanged.

use std::sync::Arc;

use tracing::{debug, info};

use clipscope_ml_client::{GenerativeModel, MlError};
use clipscope_models::{PreparedImage, VideoMetadata};

use crate::error::{PipelineError, PipelineResult};
use crate::metrics::record_quota_error;

/// Payloads this small are placeholders or truncated fetches.
pub const MIN_IMAGE_PAYLOAD: usize = 100;

/// Keep only images large enough to be real.
pub fn usable_images(images: &[PreparedImage]) -> Vec<PreparedImage> {
    images
        .iter()
        .filter(|img| img.len() > MIN_IMAGE_PAYLOAD)
        .cloned()
        .collect()
}

/// Build the rubric prompt for one video.
pub fn build_vision_prompt(metadata: &VideoMetadata, image_count: usize) -> String {
    let description = if metadata.description.trim().is_empty() {
        "(no caption)"
    } else {
        metadata.description.trim()
    };
    let author = if metadata.author_handle.trim().is_empty() {
        "unknown"
    } else {
        metadata.author_handle.trim()
    };

    format!(
        r#"You are analyzing a short-form product video so a beginner creator can recreate it.
You are given {image_count} still image(s) from the video.

VIDEO CONTEXT:
- Caption: {description}
- Creator: @{author}
- Views: {views}

Answer with the following sections, in this order.

1. VISUAL ANALYSIS
   1. Subject: what the video is about
   2. Camera setup: angle, framing and movement
   3. Lighting
   4. Background and setting
   5. Props and products visible
   6. Visible person: who appears and how they are styled
   7. On-screen text or graphics
   8. Color and mood

2. REPLICATION GUIDE
   - Shopping list with an estimated price for every item, ending with "Total: $N"
   - Setup steps
   - Shot-by-shot breakdown

3. DIFFICULTY
   - Equipment: N/10
   - Acting: N/10
   - Setup: N/10
   - Difficulty: N/10 (how hard the whole video is to recreate)
   - Overall: N/10 (how replicable the video is)
   - Budget: $N

4. BEGINNER VERDICT
   Can a complete beginner recreate this? Answer with exactly one of:
   ✅ YES
   ⚠️ YES BUT <what they need to watch out for>
   ❌ NO
   followed by one sentence of reasoning.

5. MONETIZATION
   Affiliate or product angles this video suits, with an estimated commission per sale.

Use plain numbers in the DIFFICULTY section so they can be read back exactly.
"#,
        views = metadata.view_count,
    )
}

/// Runs the vision model over prepared images.
pub struct VisionAnalyzer {
    model: Arc<dyn GenerativeModel>,
}

impl VisionAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Analyze one video. Fails with [`PipelineError::NoValidImages`] when no
    /// image survives filtering; a provider quota rejection is reported and
    /// surfaced as [`PipelineError::ProviderQuota`].
    pub async fn analyze(&self, metadata: &VideoMetadata, images: &[PreparedImage]) -> PipelineResult<String> {
        let usable = usable_images(images);
        let dropped = images.len() - usable.len();
        if dropped > 0 {
            debug!(dropped, "Dropped undersized image payloads");
        }
        if usable.is_empty() {
            return Err(PipelineError::NoValidImages);
        }

        let prompt = build_vision_prompt(metadata, usable.len());

        match self.model.generate(&prompt, &usable).await {
            Ok(text) => {
                info!(
                    model = self.model.model_name(),
                    images = usable.len(),
                    chars = text.len(),
                    "Vision analysis completed"
                );
                Ok(text)
            }
            Err(MlError::QuotaExceeded(detail)) => {
                record_quota_error("vision", &detail);
                Err(PipelineError::ProviderQuota(detail))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use clipscope_ml_client::MlResult;
    use std::sync::Mutex;

    /// Records calls and answers with a fixed result.
    pub struct FakeModel {
        pub answer: Mutex<Option<MlResult<String>>>,
        pub default_answer: String,
        pub calls: Mutex<Vec<(String, usize)>>,
    }

    impl FakeModel {
        pub fn answering(text: &str) -> Self {
            Self {
                answer: Mutex::new(None),
                default_answer: text.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: MlError) -> Self {
            let model = Self::answering("");
            *model.answer.lock().unwrap() = Some(Err(err));
            model
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> String {
            self.calls
                .lock()
                .unwrap()
                .last()
                .map(|(p, _)| p.clone())
                .unwrap_or_default()
        }

        pub fn last_image_count(&self) -> usize {
            self.calls.lock().unwrap().last().map(|(_, n)| *n).unwrap_or(0)
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        async fn generate(&self, prompt: &str, images: &[PreparedImage]) -> MlResult<String> {
            self.calls.lock().unwrap().push((prompt.to_string(), images.len()));
            match self.answer.lock().unwrap().take() {
                Some(result) => result,
                None => Ok(self.default_answer.clone()),
            }
        }

        fn model_name(&self) -> &str {
            "fake-model"
        }
    }

    pub fn image(bytes: usize) -> PreparedImage {
        PreparedImage::jpeg("A".repeat(bytes))
    }
}
