//! Response envelope for analysis requests.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::reference::AnalysisMode;

/// Outcome status of one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Failure isolated to one candidate of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemError {
    /// Position of the candidate in the discovery results
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Stable error kind (e.g. `video_resolution`, `no_valid_images`)
    pub kind: String,
    pub message: String,
}

/// Result for one video in an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoOutcome {
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BatchItemError>,
}

impl VideoOutcome {
    pub fn success(result: AnalysisResult) -> Self {
        Self {
            status: OutcomeStatus::Success,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: BatchItemError) -> Self {
        Self {
            status: OutcomeStatus::Error,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Envelope returned for every analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEnvelope {
    pub mode: AnalysisMode,
    pub results: Vec<VideoOutcome>,
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl AnalysisEnvelope {
    pub fn new(mode: AnalysisMode, results: Vec<VideoOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            mode,
            requested: results.len(),
            failed: results.len() - succeeded,
            succeeded,
            results,
        }
    }
}
