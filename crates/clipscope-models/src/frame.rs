//! Still frames and render jobs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Relative position in the video a frame is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FrameOffset {
    /// 0%
    Start,
    /// 50%
    Middle,
    /// 95%
    End,
}

impl FrameOffset {
    /// The fixed offsets, in output order.
    pub const ALL: [FrameOffset; 3] = [FrameOffset::Start, FrameOffset::Middle, FrameOffset::End];

    pub fn fraction(&self) -> f64 {
        match self {
            FrameOffset::Start => 0.0,
            FrameOffset::Middle => 0.5,
            FrameOffset::End => 0.95,
        }
    }

    pub fn percent(&self) -> u32 {
        match self {
            FrameOffset::Start => 0,
            FrameOffset::Middle => 50,
            FrameOffset::End => 95,
        }
    }
}

/// Where the images of a [`FrameSet`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum FrameSource {
    /// True per-offset stills from the render service
    #[default]
    Rendered,
    /// Coarse approximation through a generic thumbnailing proxy
    ThumbnailProxy,
    /// Single cover image (degraded analysis)
    Cover,
}

impl FrameSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameSource::Rendered => "rendered",
            FrameSource::ThumbnailProxy => "thumbnailProxy",
            FrameSource::Cover => "cover",
        }
    }

    /// Whether images from this source are real extracted frames.
    pub fn is_extracted(&self) -> bool {
        matches!(self, FrameSource::Rendered)
    }
}

/// One still image URL tagged with its offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub offset: FrameOffset,
    pub image_url: String,
}

impl Frame {
    pub fn new(offset: FrameOffset, image_url: impl Into<String>) -> Self {
        Self {
            offset,
            image_url: image_url.into(),
        }
    }
}

/// Ordered set of 0–3 extracted frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct FrameSet {
    pub frames: Vec<Frame>,
    pub source: FrameSource,
}

impl FrameSet {
    pub fn new(source: FrameSource) -> Self {
        Self {
            frames: Vec::new(),
            source,
        }
    }

    /// Build a set from per-offset results, dropping offsets that produced nothing.
    pub fn from_optional(source: FrameSource, results: Vec<(FrameOffset, Option<String>)>) -> Self {
        let mut frames: Vec<Frame> = results
            .into_iter()
            .filter_map(|(offset, url)| url.map(|u| Frame::new(offset, u)))
            .collect();
        frames.sort_by_key(|f| f.offset.percent());
        Self { frames, source }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// State of a remote render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Queued,
    Rendering,
    Done,
    Failed,
}

impl RenderStatus {
    /// Map a provider status string onto the job state.
    ///
    /// Intermediate provider states collapse into `Queued` / `Rendering`;
    /// anything unrecognized is treated as still rendering.
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "queued" | "fetching" => RenderStatus::Queued,
            "rendering" | "saving" => RenderStatus::Rendering,
            "done" => RenderStatus::Done,
            "failed" => RenderStatus::Failed,
            _ => RenderStatus::Rendering,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderStatus::Done | RenderStatus::Failed)
    }
}

/// A render job tracked for the duration of one poll loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub id: String,
    pub offset: FrameOffset,
    pub status: RenderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    pub attempts: u32,
}

impl RenderJob {
    pub fn submitted(id: impl Into<String>, offset: FrameOffset) -> Self {
        Self {
            id: id.into(),
            offset,
            status: RenderStatus::Queued,
            result_url: None,
            attempts: 0,
        }
    }
}

/// Image ready to be inlined into a model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreparedImage {
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded bytes
    pub data: String,
}

impl PreparedImage {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }

    /// Encoded payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
