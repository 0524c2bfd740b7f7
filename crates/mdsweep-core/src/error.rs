//! Error types for sweep orchestration

use crate::config::ConfigError;
use mdsweep_client::SubmitError;
use mdsweep_graph::{GraphError, ValidationError};

/// Result type alias for sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Failure of a sweep operation
///
/// Nothing is recorded in the registry when one of these is returned from
/// [`SweepService::submit_sweep`](crate::SweepService::submit_sweep).
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Request rejected before anything was built
    #[error("invalid sweep request: {0}")]
    Validation(#[from] ValidationError),

    /// Built graph failed its structural check
    #[error("invalid workflow graph: {0}")]
    Graph(#[from] GraphError),

    /// Execution service did not accept the graph
    #[error("submission failed: {0}")]
    Submission(#[from] SubmitError),

    /// Service could not be assembled from configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SweepError {
    /// Whether the operator's input caused the failure
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether resubmitting the same request might succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Submission(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// HTTP status an operator-facing API should answer with
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Submission(SubmitError::Timeout { .. }) => 504,
            Self::Submission(_) => 502,
            Self::Graph(_) | Self::Config(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_mapping() {
        assert_eq!(
            SweepError::from(ValidationError::MissingMolecules).http_status(),
            400
        );
        assert_eq!(
            SweepError::from(SubmitError::Rejected { status: 500 }).http_status(),
            502
        );
        assert_eq!(
            SweepError::from(SubmitError::Timeout {
                after: Duration::from_secs(1)
            })
            .http_status(),
            504
        );
        assert_eq!(SweepError::from(GraphError::CycleDetected("a".to_string())).http_status(), 500);
    }

    #[test]
    fn only_validation_is_invalid_request() {
        assert!(SweepError::from(ValidationError::InvalidStep(0.0)).is_invalid_request());
        assert!(!SweepError::from(SubmitError::Rejected { status: 200 }).is_invalid_request());
    }

    #[test]
    fn retryable_follows_submission() {
        assert!(SweepError::from(SubmitError::Rejected { status: 502 }).is_retryable());
        assert!(!SweepError::from(ValidationError::MissingMolecules).is_retryable());
    }
}
