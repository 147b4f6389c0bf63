//! Caller input classification.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::is_video_platform_url;

/// Result count for keyword searches when neither caller nor deployment sets one.
pub const DEFAULT_BATCH_COUNT: u32 = 20;

/// Upper bound on keyword search results.
pub const MAX_BATCH_COUNT: u32 = 50;

/// Maximum accepted reference length.
pub const MAX_REFERENCE_LENGTH: usize = 2048;

/// How a request is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// One video identified by a direct link.
    Single,
    /// Several videos discovered from a keyword.
    Batch,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Single => "single",
            AnalysisMode::Batch => "batch",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("Video reference cannot be empty")]
    Empty,

    #[error("Video reference exceeds maximum length of {MAX_REFERENCE_LENGTH} characters")]
    TooLong,
}

/// A caller-supplied video reference, tagged with its processing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoReference {
    /// Trimmed input (a URL in single mode, a keyword in batch mode)
    pub raw: String,
    pub mode: AnalysisMode,
    /// Number of videos to discover (batch mode only; `None` uses the
    /// deployment default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl VideoReference {
    /// Classify raw input.
    ///
    /// Links to a recognized video platform are analyzed as a single video;
    /// anything else is treated as a search keyword.
    pub fn classify(input: &str, count: Option<u32>) -> Result<Self, ReferenceError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ReferenceError::Empty);
        }
        if raw.len() > MAX_REFERENCE_LENGTH {
            return Err(ReferenceError::TooLong);
        }

        if is_video_platform_url(raw) {
            Ok(Self::single(raw))
        } else {
            Ok(Self::batch(raw, count))
        }
    }

    pub fn single(url: impl Into<String>) -> Self {
        Self {
            raw: url.into(),
            mode: AnalysisMode::Single,
            count: None,
        }
    }

    pub fn batch(keyword: impl Into<String>, count: Option<u32>) -> Self {
        Self {
            raw: keyword.into(),
            mode: AnalysisMode::Batch,
            count: count.map(clamp_batch_count),
        }
    }
}

/// Clamp a keyword search result count into `1..=MAX_BATCH_COUNT`.
pub fn clamp_batch_count(count: u32) -> u32 {
    count.clamp(1, MAX_BATCH_COUNT)
}
