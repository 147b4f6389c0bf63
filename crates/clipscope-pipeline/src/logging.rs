//! Structured analysis logging utilities.
//!
//! Provides consistent, structured logging for analysis requests with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Analysis logger for structured logging with consistent formatting.
///
/// Every event carries the request ID and the operation (`analyze_single`,
/// `analyze_batch`, `compose_script`) so one request can be followed through
/// the pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    request_id: String,
    operation: String,
}

impl AnalysisLogger {
    /// Create a logger for a request and operation.
    ///
    /// # Arguments
    /// * `request_id` - Identifier of the HTTP request or CLI run
    /// * `operation` - The step being logged (e.g. "analyze_single", "compose_script")
    pub fn new(request_id: &str, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create a logger with a freshly generated request ID.
    ///
    /// Used where no request ID arrives from outside, such as the CLI.
    pub fn generate(operation: &str) -> Self {
        Self::new(&Uuid::new_v4().to_string(), operation)
    }

    /// Log the start of an analysis step.
    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis started: {}", message
        );
    }

    /// Log progress within a step, such as discovered candidates.
    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis progress: {}", message
        );
    }

    /// Log a recoverable problem, such as a degraded frame source or a failed batch item.
    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis warning: {}", message
        );
    }

    /// Log a failure that ends the step.
    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis error: {}", message
        );
    }

    /// Log the completion of an analysis step.
    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Analysis completed: {}", message
        );
    }

    /// Get the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Get the operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Logger for a sub-operation of the same request.
    ///
    /// Batch items use this so each item logs under its own operation while
    /// sharing the batch's request ID.
    pub fn child(&self, operation: &str) -> Self {
        Self::new(&self.request_id, operation)
    }

    /// Create a tracing span for this request.
    ///
    /// Attach it to futures with `Instrument` so events from collaborators
    /// carry the request ID too.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = AnalysisLogger::new("req-123", "analyze_single");
        assert_eq!(logger.request_id(), "req-123");
        assert_eq!(logger.operation(), "analyze_single");
    }

    #[test]
    fn test_child_keeps_request_id() {
        let logger = AnalysisLogger::generate("analyze_batch");
        let child = logger.child("analyze_single");
        assert_eq!(child.request_id(), logger.request_id());
        assert_eq!(child.operation(), "analyze_single");
        assert!(!logger.request_id().is_empty());
    }
}
