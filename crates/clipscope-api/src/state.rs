//! Application state.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use clipscope_ml_client::GenerativeModel;
use clipscope_pipeline::{Orchestrator, PipelineConfig, ScriptComposer};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Usage accounting hook consulted before each analysis or script request.
#[async_trait]
pub trait UsageQuota: Send + Sync {
    /// Returns false when the caller may not run `operation` now.
    async fn check(&self, client_key: &str, operation: &'static str) -> bool;
}

/// Quota that admits every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnlimitedQuota;

#[async_trait]
impl UsageQuota for UnlimitedQuota {
    async fn check(&self, _client_key: &str, _operation: &'static str) -> bool {
        true
    }
}

/// Which optional collaborators are configured.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub model: Option<String>,
    pub metadata_strategies: Vec<&'static str>,
    pub frame_strategies: Vec<&'static str>,
    pub keyword_discovery: bool,
}

/// Pipeline components built around one model client.
pub struct AnalysisServices {
    pub orchestrator: Orchestrator,
    pub composer: ScriptComposer,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// Absent when no model key is configured; analysis endpoints then answer 503
    pub services: Option<Arc<AnalysisServices>>,
    pub quota: Arc<dyn UsageQuota>,
    pub capabilities: Capabilities,
}

impl AppState {
    /// Build state from configuration and an optional model client.
    pub fn new(
        config: ApiConfig,
        pipeline: &PipelineConfig,
        model: Option<Arc<dyn GenerativeModel>>,
    ) -> ApiResult<Self> {
        let Some(model) = model else {
            return Ok(Self {
                config,
                services: None,
                quota: Arc::new(UnlimitedQuota),
                capabilities: Capabilities {
                    model: None,
                    metadata_strategies: Vec::new(),
                    frame_strategies: Vec::new(),
                    keyword_discovery: false,
                },
            });
        };

        let orchestrator = Orchestrator::from_config(pipeline, Arc::clone(&model))?;
        let capabilities = Capabilities {
            model: Some(model.model_name().to_string()),
            metadata_strategies: orchestrator.metadata_strategies(),
            frame_strategies: orchestrator.frame_strategies(),
            keyword_discovery: orchestrator.discovery_enabled(),
        };
        let composer = ScriptComposer::new(model);

        Ok(Self {
            config,
            services: Some(Arc::new(AnalysisServices {
                orchestrator,
                composer,
            })),
            quota: Arc::new(UnlimitedQuota),
            capabilities,
        })
    }

    pub fn with_quota(mut self, quota: Arc<dyn UsageQuota>) -> Self {
        self.quota = quota;
        self
    }

    /// Analysis services, or 503 when the model is not configured.
    pub fn services(&self) -> ApiResult<&AnalysisServices> {
        self.services
            .as_deref()
            .ok_or_else(|| ApiError::unavailable("Vision model is not configured"))
    }

    pub fn is_ready(&self) -> bool {
        self.services.is_some()
    }
}
