//! Video analysis pipeline.
//!
//! This crate provides:
//! - Video metadata resolution with a strategy chain and keyword discovery
//! - Vision analysis and structured field extraction
//! - Single and batch orchestration with cover-image degradation
//! - Script composition from a prior analysis

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod resolver;
pub mod scraper;
pub mod script;
pub mod structurer;
pub mod vision;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::AnalysisLogger;
pub use orchestrator::{DegradeReason, Orchestrator};
pub use resolver::{EmbedStrategy, MetadataStrategy, VideoResolver};
pub use scraper::{ScraperClient, ScraperConfig, ScraperStrategy, VideoCandidate, VideoDiscovery};
pub use script::{extract_sections, ScriptComposer};
pub use structurer::structure;
pub use vision::VisionAnalyzer;
