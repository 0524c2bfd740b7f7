//! Service configuration
//!
//! Loaded from TOML, then overridden from the environment:
//!
//! ```toml
//! service_url = "http://localhost:51404/apps"
//!
//! [storage]
//! region = "eu-central-1"
//! bucket = "paasage-bucket"
//! path = "results/"
//!
//! [registry]
//! ttl_secs = 3600
//!
//! [graph]
//! output_policy = "all_produced"
//! ```

use crate::telemetry::LoggingConfig;
use mdsweep_client::{HttpConfig, DEFAULT_SERVICE_URL};
use mdsweep_graph::BuildOptions;
use mdsweep_registry::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`SweepConfig::service_url`]
pub const ENV_SERVICE_URL: &str = "MDSWEEP_SERVICE_URL";
/// Environment variable overriding [`StorageConfig::region`]
pub const ENV_S3_REGION: &str = "MDSWEEP_S3_REGION";
/// Environment variable overriding [`StorageConfig::bucket`]
pub const ENV_S3_BUCKET: &str = "MDSWEEP_S3_BUCKET";
/// Environment variable overriding [`StorageConfig::path`]
pub const ENV_S3_PATH: &str = "MDSWEEP_S3_PATH";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`SweepConfig`]
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Object storage the execution service writes artifacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// S3 region
    pub region: String,
    /// Bucket name
    pub bucket: String,
    /// Key prefix of the results
    pub path: String,
    /// Explicit base URL for S3-compatible stores; replaces the AWS layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: "eu-central-1".to_string(),
            bucket: "paasage-bucket".to_string(),
            path: "results/".to_string(),
            endpoint: None,
        }
    }
}

impl StorageConfig {
    /// Base URL artifact names are appended to
    #[must_use]
    pub fn base_url(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        format!(
            "http://s3.{}.amazonaws.com/{}/{}",
            self.region, self.bucket, self.path
        )
    }
}

/// Registry sizing and expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Lifetime of each entry in seconds
    pub ttl_secs: u64,
    /// Maximum cached entries
    pub max_entries: u64,
    /// Length of the recent-experiments list
    pub max_index_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            ttl_secs: store.ttl.as_secs(),
            max_entries: store.max_entries,
            max_index_len: store.max_index_len,
        }
    }
}

impl RegistryConfig {
    /// Store configuration for the registry backend
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            ttl: Duration::from_secs(self.ttl_secs),
            max_entries: self.max_entries,
            max_index_len: self.max_index_len,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Execution service endpoint graphs are posted to
    pub service_url: ServiceUrl,
    /// Artifact storage
    pub storage: StorageConfig,
    /// Experiment registry
    pub registry: RegistryConfig,
    /// HTTP client timeouts
    pub http: HttpConfig,
    /// Graph builder options
    pub graph: BuildOptions,
    /// Log output
    pub logging: LoggingConfig,
}

/// Execution service URL with its default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceUrl(pub String);

impl Default for ServiceUrl {
    fn default() -> Self {
        Self(DEFAULT_SERVICE_URL.to_string())
    }
}

impl ServiceUrl {
    /// Borrow as `&str`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SweepConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With execution service URL
    #[inline]
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = ServiceUrl(url.into());
        self
    }

    /// With storage settings
    #[inline]
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// With registry settings
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    /// With graph builder options
    #[inline]
    #[must_use]
    pub fn with_graph(mut self, graph: BuildOptions) -> Self {
        self.graph = graph;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SweepConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    #[must_use]
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.service_url = ServiceUrl(url);
        }
        if let Some(region) = lookup(ENV_S3_REGION) {
            self.storage.region = region;
        }
        if let Some(bucket) = lookup(ENV_S3_BUCKET) {
            self.storage.bucket = bucket;
        }
        if let Some(path) = lookup(ENV_S3_PATH) {
            self.storage.path = path;
        }
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_url.as_str().trim().is_empty() {
            return Err(ConfigError::invalid("service_url", "must not be empty"));
        }
        if self.registry.ttl_secs == 0 {
            return Err(ConfigError::invalid("registry.ttl_secs", "must be positive"));
        }
        if self.registry.max_index_len == 0 {
            return Err(ConfigError::invalid(
                "registry.max_index_len",
                "must be positive",
            ));
        }
        // every indexed id must fit in the cache or listings lose entries
        let index_len = u64::try_from(self.registry.max_index_len).unwrap_or(u64::MAX);
        if self.registry.max_entries < index_len {
            return Err(ConfigError::invalid(
                "registry.max_entries",
                "must be at least registry.max_index_len",
            ));
        }
        if self.http.submit_timeout_secs == 0 || self.http.probe_timeout_secs == 0 {
            return Err(ConfigError::invalid("http", "timeouts must be positive"));
        }
        Ok(())
    }
}
