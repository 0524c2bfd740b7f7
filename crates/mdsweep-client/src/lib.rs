//! mdsweep Client - talking to the execution service and object storage
//!
//! - [`submit`]: post a workflow graph, get a [`StatusHandle`] back
//! - [`probe`]: check whether an output artifact has appeared
//!
//! Both seams are traits ([`WorkflowSubmitter`], [`ArtifactProbe`]) so the
//! orchestration layer can be driven without a network.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod probe;
pub mod submit;

// Re-exports for convenience
pub use config::{HttpConfig, DEFAULT_SERVICE_URL};
pub use error::SubmitError;
pub use probe::{ArtifactProbe, HttpProbe, ProbeStatus, StatusReply};
pub use submit::{HttpSubmitter, StatusHandle, WorkflowSubmitter};
