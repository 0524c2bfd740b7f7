//! Submission errors
//!
//! Every variant aborts the current submission. None is retried
//! automatically: resubmitting would start a second graph writing the same
//! artifact names.

use std::time::Duration;

/// Errors from [`WorkflowSubmitter::submit`](crate::WorkflowSubmitter::submit)
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Service answered with something other than 201 Created
    #[error("execution service rejected the workflow (HTTP {status})")]
    Rejected {
        /// HTTP status received
        status: u16,
    },

    /// Service accepted but gave no usable status handle
    #[error("malformed response from execution service: {0}")]
    MalformedResponse(String),

    /// No response within the configured timeout
    #[error("execution service did not answer within {after:?}")]
    Timeout {
        /// Configured timeout
        after: Duration,
    },

    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Graph could not be encoded
    #[error("failed to encode workflow: {0}")]
    Encode(#[from] serde_json::Error),

    /// Endpoint URL or client setup is unusable
    #[error("invalid execution service endpoint: {0}")]
    InvalidEndpoint(String),
}

impl SubmitError {
    /// HTTP status of a rejection
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service never answered
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether an operator could reasonably resubmit
    ///
    /// Submissions are never retried automatically: a timed-out request may
    /// still have started the workflow.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Rejected { status } => *status >= 500,
            Self::MalformedResponse(_) | Self::Encode(_) | Self::InvalidEndpoint(_) => false,
        }
    }
}
