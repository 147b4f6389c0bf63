//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use clipscope_models::ReferenceError;
use clipscope_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Usage limit reached")]
    UsageLimited,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<ReferenceError> for ApiError {
    fn from(err: ReferenceError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UsageLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(err) => match err {
                PipelineError::VideoResolution(_) | PipelineError::NoValidImages => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PipelineError::ProviderQuota(_) => StatusCode::TOO_MANY_REQUESTS,
                PipelineError::DiscoveryUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "validation",
            ApiError::UsageLimited => "usage_limited",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Pipeline(err) => err.kind(),
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let production = std::env::var("ENVIRONMENT")
            .map(|e| e.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Pipeline(err) if !self.is_internal() => err.user_message(),
            _ if self.is_internal() && production => "An internal error occurred".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            detail,
            code: Some(self.code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}
