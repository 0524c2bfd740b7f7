//! HTTP client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default execution service endpoint
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:51404/apps";

/// Media type of submitted graphs
pub const MEDIA_TYPE: &str = "application/json";

/// Timeouts and identity used by the HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout of a graph submission, in seconds
    pub submit_timeout_secs: u64,
    /// Timeout of one artifact probe, in seconds
    pub probe_timeout_secs: u64,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            submit_timeout_secs: 30,
            probe_timeout_secs: 10,
            user_agent: concat!("mdsweep/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Submission timeout
    #[inline]
    #[must_use]
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// Probe timeout
    #[inline]
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// With submission timeout in seconds
    #[inline]
    #[must_use]
    pub fn with_submit_timeout_secs(mut self, secs: u64) -> Self {
        self.submit_timeout_secs = secs;
        self
    }

    /// With probe timeout in seconds
    #[inline]
    #[must_use]
    pub fn with_probe_timeout_secs(mut self, secs: u64) -> Self {
        self.probe_timeout_secs = secs;
        self
    }
}
