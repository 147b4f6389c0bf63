//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder.

use tracing::warn;

/// Metric names.
pub mod names {
    pub const ANALYSES_TOTAL: &str = "clipscope_analyses_total";
    pub const DEGRADED_TOTAL: &str = "clipscope_degraded_total";
    pub const PROVIDER_QUOTA_ERRORS_TOTAL: &str = "clipscope_provider_quota_errors_total";
    pub const ANALYSIS_DURATION: &str = "clipscope_analysis_duration_seconds";
}

/// Record one finished analysis.
pub fn record_analysis(mode: &'static str, outcome: &'static str, duration_secs: f64) {
    metrics::counter!(names::ANALYSES_TOTAL, "mode" => mode, "outcome" => outcome).increment(1);
    metrics::histogram!(names::ANALYSIS_DURATION, "mode" => mode).record(duration_secs);
}

/// Record a fall back to the cover image.
pub fn record_degraded(reason: &'static str) {
    metrics::counter!(names::DEGRADED_TOTAL, "reason" => reason).increment(1);
}

/// Report a provider quota rejection to operators.
pub fn record_quota_error(operation: &'static str, detail: &str) {
    warn!(
        target: "clipscope::quota",
        operation,
        detail,
        "Model provider quota exceeded"
    );
    metrics::counter!(names::PROVIDER_QUOTA_ERRORS_TOTAL, "operation" => operation).increment(1);
}
