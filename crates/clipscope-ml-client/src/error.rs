//! ML client error types.

use thiserror::Error;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MlError {
    /// Whether the provider rejected the call for quota or rate reasons.
    pub fn is_quota(&self) -> bool {
        matches!(self, MlError::QuotaExceeded(_))
    }

    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
            MlError::QuotaExceeded(format!("provider returned {}: {}", status, truncate(body, 300)))
        } else {
            MlError::RequestFailed(format!("provider returned {}: {}", status, truncate(body, 300)))
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_quota() {
        assert!(MlError::from_status(429, "slow down").is_quota());
        assert!(MlError::from_status(403, r#"{"status":"RESOURCE_EXHAUSTED"}"#).is_quota());
        assert!(!MlError::from_status(500, "boom").is_quota());
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
