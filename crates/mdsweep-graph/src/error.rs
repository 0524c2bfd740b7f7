//! Error types for graph synthesis
//!
//! Provides error handling for:
//! - Sweep input validation (before a graph is built)
//! - Structural validation of a built or hand-assembled graph

/// Errors raised while validating a [`SweepRequest`](crate::SweepRequest)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Molecule count must be positive
    #[error("number of molecules is required and must be positive")]
    MissingMolecules,

    /// Simulation end time must be positive and finite
    #[error("end time of simulation is required (in seconds), got {0}")]
    InvalidSimulationTime(f64),

    /// Temperature step must be positive and finite
    #[error("temperature step must be positive, got {0}")]
    InvalidStep(f64),

    /// A temperature bound is NaN or infinite
    #[error("temperature bound '{name}' is not a finite number")]
    NonFiniteBound {
        /// Which bound (`min_temperature` / `max_temperature`)
        name: &'static str,
    },

    /// Sweep would generate more points than allowed
    #[error("sweep generates {points} temperature points, limit is {limit}")]
    TooManyPoints {
        /// Requested points
        points: u64,
        /// Configured limit
        limit: u64,
    },

    /// Two neighbouring points would share a name
    #[error("temperature step is too fine to tell points apart near {temperature}")]
    IndistinctTemperatures {
        /// Text both points would be named with
        temperature: String,
    },
}

impl ValidationError {
    /// Name of the request field the error refers to
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingMolecules => "molecules",
            Self::InvalidSimulationTime(_) => "simulation_end_time",
            Self::InvalidStep(_)
            | Self::TooManyPoints { .. }
            | Self::IndistinctTemperatures { .. } => "step_temperature",
            Self::NonFiniteBound { name } => *name,
        }
    }
}

/// Structural violations in a [`WorkflowGraph`](crate::WorkflowGraph)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two processes share a name
    #[error("duplicate process name: {0}")]
    DuplicateProcess(String),

    /// Two signal declarations share a name
    #[error("duplicate signal declaration: {0}")]
    DuplicateSignal(String),

    /// A signal is used but never declared
    #[error("signal '{0}' is used but not declared")]
    UndeclaredSignal(String),

    /// More than one process produces the same signal
    #[error("signal '{signal}' is produced by both '{first}' and '{second}'")]
    MultipleProducers {
        /// Signal name
        signal: String,
        /// First producer
        first: String,
        /// Second producer
        second: String,
    },

    /// A consumed or declared-output signal has no producer
    #[error("signal '{signal}' needed by '{consumer}' is never produced")]
    UnproducedSignal {
        /// Process name, or `"outs"` for a declared graph output
        consumer: String,
        /// Signal name
        signal: String,
    },

    /// Processes form a cycle
    #[error("cycle detected through process '{0}'")]
    CycleDetected(String),
}
