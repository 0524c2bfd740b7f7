//! mdsweep Graph - workflow synthesis for temperature sweeps
//!
//! Turns a [`SweepRequest`] into the [`WorkflowGraph`] an external dataflow
//! execution service runs:
//! - [`naming`]: stamps and the artifact/process naming scheme
//! - [`builder`]: deterministic graph expansion
//! - [`validate`]: structural checks over any graph
//!
//! # Example
//!
//! ```rust
//! use mdsweep_graph::{Stamp, SweepGraphBuilder, SweepRequest};
//!
//! let request = SweepRequest::default().with_range(85.0, 87.0, 1.0);
//! let graph = SweepGraphBuilder::default().build(&request, &Stamp::new("1700000000"));
//!
//! assert_eq!(graph.processes.len(), 3);
//! assert!(mdsweep_graph::validate::check(&graph).is_ok());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod error;
pub mod naming;
pub mod request;
pub mod validate;
pub mod workflow;

// Re-exports for convenience
pub use builder::{BuildOptions, OutputPolicy, SweepGraphBuilder};
pub use error::{GraphError, ValidationError};
pub use naming::{format_real, PointNames, Stamp, StampIssuer};
pub use request::SweepRequest;
pub use workflow::{Executor, ProcessConfig, ProcessNode, SignalDecl, WorkflowGraph};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building sweep graphs
    pub use crate::builder::{BuildOptions, OutputPolicy, SweepGraphBuilder};
    pub use crate::naming::{Stamp, StampIssuer};
    pub use crate::request::SweepRequest;
    pub use crate::workflow::WorkflowGraph;
}
