//! Shared data models for the clipscope pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Caller references and analysis modes
//! - Video metadata and extracted frames
//! - Render jobs and prepared images
//! - Analysis results, product profiles and composed scripts
//! - The response envelope

pub mod analysis;
pub mod envelope;
pub mod frame;
pub mod reference;
pub mod script;
pub mod utils;
pub mod video;

// Re-export common types
pub use analysis::{AnalysisResult, BeginnerAssessment, StructuredFields};
pub use envelope::{AnalysisEnvelope, BatchItemError, OutcomeStatus, VideoOutcome};
pub use frame::{Frame, FrameOffset, FrameSet, FrameSource, PreparedImage, RenderJob, RenderStatus};
pub use reference::{clamp_batch_count, AnalysisMode, ReferenceError, VideoReference, DEFAULT_BATCH_COUNT};
pub use script::{ProductProfile, ScriptResult, ScriptSection};
pub use utils::{detect_platform, is_video_platform_url, VideoPlatform};
pub use video::{MetadataSource, VideoMetadata};
