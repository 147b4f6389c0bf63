//! Analysis result models.
//!
//! The structured fields are derived from free model text and are always
//! populated; defaults stand in for anything the text did not state.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::frame::FrameSource;
use crate::video::VideoMetadata;

/// Default replication score when the text states none.
pub const DEFAULT_REPLICATION_SCORE: u8 = 7;

/// Default difficulty when the text states none.
pub const DEFAULT_DIFFICULTY: u8 = 5;

/// Default budget (USD) when the text states none.
pub const DEFAULT_BUDGET_USD: u32 = 50;

/// Whether a novice can replicate the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum BeginnerAssessment {
    #[serde(rename = "yes")]
    Yes,
    #[default]
    #[serde(rename = "yes-with-conditions")]
    YesWithConditions,
    #[serde(rename = "no")]
    No,
}

impl BeginnerAssessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::YesWithConditions => "yes-with-conditions",
            Self::No => "no",
        }
    }
}

/// Numeric and categorical fields extracted from the model's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredFields {
    /// 0–10
    pub replication_score: u8,
    /// 0–10
    pub difficulty: u8,
    pub budget_usd: u32,
    pub beginner_assessment: BeginnerAssessment,
}

impl Default for StructuredFields {
    fn default() -> Self {
        Self {
            replication_score: DEFAULT_REPLICATION_SCORE,
            difficulty: DEFAULT_DIFFICULTY,
            budget_usd: DEFAULT_BUDGET_USD,
            beginner_assessment: BeginnerAssessment::default(),
        }
    }
}

/// Merged result of analyzing one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub metadata: VideoMetadata,

    /// Unmodified model answer
    pub raw_text: String,

    pub structured: StructuredFields,

    /// True only when real extracted frames were analyzed
    pub vision_used: bool,

    pub frame_source: FrameSource,

    /// Number of images sent to the model
    pub frames_analyzed: usize,

    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(
        metadata: VideoMetadata,
        raw_text: impl Into<String>,
        structured: StructuredFields,
        frame_source: FrameSource,
        frames_analyzed: usize,
    ) -> Self {
        Self {
            metadata,
            raw_text: raw_text.into(),
            structured,
            vision_used: frame_source.is_extracted(),
            frame_source,
            frames_analyzed,
            analyzed_at: Utc::now(),
        }
    }

    /// Whether the analysis fell back to the cover image.
    pub fn is_degraded(&self) -> bool {
        self.frame_source == FrameSource::Cover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::MetadataSource;

    #[test]
    fn test_structured_defaults() {
        let fields = StructuredFields::default();
        assert_eq!(fields.replication_score, 7);
        assert_eq!(fields.difficulty, 5);
        assert_eq!(fields.budget_usd, 50);
        assert_eq!(fields.beginner_assessment, BeginnerAssessment::YesWithConditions);
    }

    #[test]
    fn test_assessment_wire_names() {
        assert_eq!(
            serde_json::to_string(&BeginnerAssessment::YesWithConditions).unwrap(),
            "\"yes-with-conditions\""
        );
        let parsed: BeginnerAssessment = serde_json::from_str("\"no\"").unwrap();
        assert_eq!(parsed, BeginnerAssessment::No);
    }

    #[test]
    fn test_vision_used_follows_frame_source() {
        let meta = VideoMetadata::new("u", MetadataSource::Embed);
        let rendered = AnalysisResult::new(meta.clone(), "x", StructuredFields::default(), FrameSource::Rendered, 3);
        assert!(rendered.vision_used);

        let proxy = AnalysisResult::new(meta.clone(), "x", StructuredFields::default(), FrameSource::ThumbnailProxy, 3);
        assert!(!proxy.vision_used);

        let cover = AnalysisResult::new(meta, "x", StructuredFields::default(), FrameSource::Cover, 1);
        assert!(!cover.vision_used);
        assert!(cover.is_degraded());
    }
}
