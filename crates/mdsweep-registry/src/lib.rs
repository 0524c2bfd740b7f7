//! mdsweep Registry - transient record of submitted sweeps
//!
//! # Architecture
//!
//! ```text
//! record_new ──> insert_if_absent(id) ──> prepend_to_index(id)
//!                         │                      │
//!                         ▼                      ▼
//!                 ┌────────────────────────────────────┐
//!                 │  MokaStore (TTL per entry)         │
//!                 │  "index" → [id, id, ...]           │
//!                 │  id      → Experiment              │
//!                 └────────────────────────────────────┘
//!                         ▲
//! list_recent ──> index() ──> get_many(ids)
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod experiment;
pub mod registry;
pub mod store;

// Re-exports for convenience
pub use experiment::{Experiment, STATUS_RUNNING};
pub use registry::ExperimentRegistry;
pub use store::{ExperimentStore, MokaStore, StoreConfig};
