//! Analysis and script handlers.
//!
//! `POST /api/analyze` accepts a video URL or a search keyword and answers with
//! the analysis envelope. `POST /api/script` turns a prior analysis plus a
//! product profile into a five-section ad script.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use validator::Validate;

use clipscope_models::{AnalysisEnvelope, AnalysisResult, ProductProfile, ScriptResult, VideoReference};
use clipscope_pipeline::AnalysisLogger;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::middleware::{ClientKey, RequestId};
use crate::security::screen_input;
use crate::state::AppState;

/// Request to analyze a video or a keyword.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Video page URL or search keyword
    pub input: String,
    /// Result count for keyword searches
    #[serde(default)]
    pub count: Option<u32>,
}

/// Analyze a single video or a batch of keyword results.
pub async fn analyze(
    State(state): State<AppState>,
    client: ClientKey,
    request_id: Option<Extension<RequestId>>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalysisEnvelope>> {
    let input = screen_input(&request.input).map_err(|r| ApiError::bad_request(r.message()))?;
    let reference = VideoReference::classify(&input, request.count)?;
    let services = state.services()?;

    ensure_quota(&state, &client, "analyze").await?;

    let logger = logger_for(request_id, &format!("analyze_{}", reference.mode.as_str()));
    logger.log_start(&format!("client={} count={:?}", client.0, reference.count));

    let envelope = services.orchestrator.analyze(&reference, &logger).await?;

    logger.log_completion(&format!(
        "succeeded={} failed={}",
        envelope.succeeded, envelope.failed
    ));
    Ok(Json(envelope))
}

/// Request to compose an ad script.
#[derive(Debug, Deserialize)]
pub struct ScriptRequest {
    pub analysis: AnalysisResult,
    pub product: ProductProfile,
}

/// Compose an ad script from a prior analysis.
pub async fn compose_script(
    State(state): State<AppState>,
    client: ClientKey,
    request_id: Option<Extension<RequestId>>,
    Json(request): Json<ScriptRequest>,
) -> ApiResult<Json<ScriptResult>> {
    request.product.validate()?;
    let services = state.services()?;

    ensure_quota(&state, &client, "script").await?;

    let logger = logger_for(request_id, "compose_script");
    logger.log_start(&format!("product={}", request.product.name));

    let script = services
        .composer
        .compose(&request.analysis, &request.product)
        .await?;

    logger.log_completion("script composed");
    Ok(Json(script))
}

async fn ensure_quota(state: &AppState, client: &ClientKey, operation: &'static str) -> ApiResult<()> {
    if state.quota.check(&client.0, operation).await {
        return Ok(());
    }
    metrics::record_usage_denied(operation);
    Err(ApiError::UsageLimited)
}

fn logger_for(request_id: Option<Extension<RequestId>>, operation: &str) -> AnalysisLogger {
    match request_id {
        Some(Extension(RequestId(id))) => AnalysisLogger::new(&id, operation),
        None => AnalysisLogger::generate(operation),
    }
}
