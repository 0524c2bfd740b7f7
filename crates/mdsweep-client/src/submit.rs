//! Workflow submission
//!
//! Posts a [`WorkflowGraph`] to the execution service and returns the status
//! handle from the `Location` header of the `201 Created` response.

use crate::config::{HttpConfig, MEDIA_TYPE};
use crate::error::SubmitError;
use async_trait::async_trait;
use mdsweep_graph::WorkflowGraph;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Locator of a submitted graph's run on the execution service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHandle(String);

impl StatusHandle {
    /// Wrap a locator
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Borrow as `&str`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Submits graphs to an execution service
#[async_trait]
pub trait WorkflowSubmitter: Send + Sync + fmt::Debug {
    /// Submit `graph` once
    async fn submit(&self, graph: &WorkflowGraph) -> Result<StatusHandle, SubmitError>;
}

/// [`WorkflowSubmitter`] posting JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpSubmitter {
    /// Create a submitter for `endpoint`
    ///
    /// # Errors
    /// [`SubmitError::InvalidEndpoint`] if the URL does not parse or the
    /// client cannot be built.
    pub fn new(endpoint: &str, config: &HttpConfig) -> Result<Self, SubmitError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SubmitError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        let timeout = config.submit_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| SubmitError::InvalidEndpoint(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Endpoint graphs are posted to
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> SubmitError {
        if err.is_timeout() {
            SubmitError::Timeout {
                after: self.timeout,
            }
        } else {
            SubmitError::Transport(err)
        }
    }
}

#[async_trait]
impl WorkflowSubmitter for HttpSubmitter {
    async fn submit(&self, graph: &WorkflowGraph) -> Result<StatusHandle, SubmitError> {
        let body = graph.to_json_pretty()?;
        tracing::debug!(
            endpoint = %self.endpoint,
            processes = graph.processes.len(),
            bytes = body.len(),
            "Submitting workflow"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::warn!(status = status.as_u16(), "Workflow submission rejected");
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .ok_or_else(|| SubmitError::MalformedResponse("missing Location header".into()))?
            .to_str()
            .map_err(|_| SubmitError::MalformedResponse("Location header is not text".into()))?;

        // relative locations resolve against the request URL
        let handle = response.url().join(location).map_err(|e| {
            SubmitError::MalformedResponse(format!("unparsable Location '{location}': {e}"))
        })?;

        tracing::info!(status_url = %handle, "Workflow accepted");
        Ok(StatusHandle::new(handle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_endpoint() {
        let err = HttpSubmitter::new("not a url", &HttpConfig::default()).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidEndpoint(_)));
    }

    #[test]
    fn keeps_endpoint() {
        let submitter =
            HttpSubmitter::new("http://localhost:51404/apps", &HttpConfig::default()).unwrap();
        assert_eq!(submitter.endpoint().path(), "/apps");
    }

    #[test]
    fn status_handle_display() {
        let handle = StatusHandle::new("http://hf/apps/1");
        assert_eq!(handle.to_string(), "http://hf/apps/1");
        assert_eq!(handle.as_str(), "http://hf/apps/1");
    }
}
