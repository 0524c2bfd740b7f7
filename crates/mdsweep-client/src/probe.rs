//! Artifact completion probing
//!
//! An artifact counts as finished once its locator answers `200 OK`. Every
//! other outcome, failures included, reads as still running: callers poll
//! again later.

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion state of one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// Artifact is reachable
    Finished,
    /// Artifact not reachable yet
    Running,
    /// No locator to probe
    NotApplicable,
}

impl ProbeStatus {
    /// Operator-facing label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Finished => "Finished",
            Self::Running => "Running",
            Self::NotApplicable => "n/a",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// JSON answer of the status query
///
/// `{"status":"Finished"}`, `{"status":"Running"}` or `{"error":"n/a"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReply {
    /// Status label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Error label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ProbeStatus> for StatusReply {
    fn from(status: ProbeStatus) -> Self {
        match status {
            ProbeStatus::NotApplicable => Self {
                status: None,
                error: Some(status.label().to_string()),
            },
            _ => Self {
                status: Some(status.label().to_string()),
                error: None,
            },
        }
    }
}

/// Checks whether an artifact exists yet
#[async_trait]
pub trait ArtifactProbe: Send + Sync + fmt::Debug {
    /// Probe `locator`; never fails
    async fn probe(&self, locator: &str) -> ProbeStatus;
}

/// [`ArtifactProbe`] issuing HTTP GET requests
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Create a probe
    ///
    /// # Errors
    /// Propagates client construction failures.
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.probe_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArtifactProbe for HttpProbe {
    async fn probe(&self, locator: &str) -> ProbeStatus {
        if locator.trim().is_empty() {
            return ProbeStatus::NotApplicable;
        }

        match self.client.get(locator).send().await {
            Ok(response) if response.status() == StatusCode::OK => ProbeStatus::Finished,
            Ok(response) => {
                tracing::debug!(%locator, status = response.status().as_u16(), "Artifact not available yet");
                ProbeStatus::Running
            }
            Err(e) => {
                tracing::debug!(%locator, error = %e, "Artifact probe failed");
                ProbeStatus::Running
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_shapes() {
        let finished = serde_json::to_string(&StatusReply::from(ProbeStatus::Finished)).unwrap();
        assert_eq!(finished, r#"{"status":"Finished"}"#);

        let running = serde_json::to_string(&StatusReply::from(ProbeStatus::Running)).unwrap();
        assert_eq!(running, r#"{"status":"Running"}"#);

        let na = serde_json::to_string(&StatusReply::from(ProbeStatus::NotApplicable)).unwrap();
        assert_eq!(na, r#"{"error":"n/a"}"#);
    }

    #[tokio::test]
    async fn empty_locator_is_not_applicable() {
        let probe = HttpProbe::new(&HttpConfig::default()).unwrap();
        assert_eq!(probe.probe("").await, ProbeStatus::NotApplicable);
        assert_eq!(probe.probe("   ").await, ProbeStatus::NotApplicable);
    }

    #[tokio::test]
    async fn unparsable_locator_is_running() {
        let probe = HttpProbe::new(&HttpConfig::default()).unwrap();
        assert_eq!(probe.probe("not a url").await, ProbeStatus::Running);
    }
}
