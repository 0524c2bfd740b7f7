//! mdsweep Core - sweep orchestration
//!
//! Turns an operator's [`SweepRequest`](mdsweep_graph::SweepRequest) into a
//! submitted workflow and a registry entry, and answers status queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                SweepService                 │
//! │  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │ GraphBuilder │  │ WorkflowSubmitter   │──┼──► execution service
//! │  └──────────────┘  └─────────────────────┘  │
//! │  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │ Registry     │  │ ArtifactProbe       │──┼──► object storage
//! │  └──────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

// Re-exports for convenience
pub use config::{ConfigError, RegistryConfig, StorageConfig, SweepConfig};
pub use error::SweepError;
pub use service::{ExperimentListing, ExperimentProgress, SweepPlan, SweepService};
pub use telemetry::{LogFormat, LoggingConfig};

/// Version of the mdsweep core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::SweepConfig;
    pub use crate::error::{Result, SweepError};
    pub use crate::service::SweepService;
    pub use mdsweep_client::ProbeStatus;
    pub use mdsweep_graph::{Stamp, SweepRequest};
    pub use mdsweep_registry::Experiment;
}
