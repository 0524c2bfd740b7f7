//! Sweep graph builder
//!
//! Expands a [`SweepRequest`] into a [`WorkflowGraph`]: one simulation
//! process per temperature, each fed by the shared `start` signal, and an
//! optional rendering process consuming that simulation's archive.
//!
//! ```text
//!            ┌─> run-simulation-85 ─> *-85.tgz ─> run-povray-85 ─> *-85.avi
//! start ─────┼─> run-simulation-86 ─> *-86.tgz ─> run-povray-86 ─> *-86.avi
//!            └─> ...
//! ```

use crate::naming::{format_real, PointNames, Stamp, START_SIGNAL};
use crate::request::SweepRequest;
use crate::workflow::{ProcessNode, SignalDecl, WorkflowGraph};
use serde::{Deserialize, Serialize};

/// Default simulation entry point on the workers
pub const DEFAULT_SIMULATION_EXECUTABLE: &str = "/MD_v4_MPI/run-cmd.sh";

/// Default rendering entry point on the workers
pub const DEFAULT_RENDER_EXECUTABLE: &str = "/MD_v4_MPI/make-movie.sh";

/// Which produced signals are listed in the graph's `outs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Every archive and video, even archives consumed by rendering
    #[default]
    AllProduced,
    /// Only signals no process consumes
    SinksOnly,
}

/// Builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Executable of the simulation stage
    pub simulation_executable: String,
    /// Executable of the rendering stage
    pub render_executable: String,
    /// Declared outputs policy
    pub output_policy: OutputPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            simulation_executable: DEFAULT_SIMULATION_EXECUTABLE.to_string(),
            render_executable: DEFAULT_RENDER_EXECUTABLE.to_string(),
            output_policy: OutputPolicy::AllProduced,
        }
    }
}

impl BuildOptions {
    /// With output policy
    #[inline]
    #[must_use]
    pub fn with_output_policy(mut self, policy: OutputPolicy) -> Self {
        self.output_policy = policy;
        self
    }
}

/// Builds workflow graphs for temperature sweeps
///
/// Usage:
/// ```rust,ignore
/// let builder = SweepGraphBuilder::default();
/// let graph = builder.build(&request, &stamp);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SweepGraphBuilder {
    options: BuildOptions,
}

impl SweepGraphBuilder {
    /// Create a builder with the given options
    #[inline]
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Builder options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the graph for `request`, naming artifacts with `stamp`
    ///
    /// Pure: the same request and stamp always give the same graph. The
    /// request is expected to be validated already; an empty range simply
    /// yields a graph with no processes.
    #[must_use]
    pub fn build(&self, request: &SweepRequest, stamp: &Stamp) -> WorkflowGraph {
        let mut graph = WorkflowGraph::with_start();
        let molecules = request.molecules.to_string();
        let end_time = format_real(request.simulation_end_time);

        for temperature in request.temperature_grid() {
            let names = PointNames::new(stamp, temperature);

            graph.push_process(ProcessNode::command(
                names.simulation_process.clone(),
                self.options.simulation_executable.clone(),
                vec![
                    molecules.clone(),
                    end_time.clone(),
                    names.temperature.clone(),
                    names.archive.clone(),
                ],
                vec![START_SIGNAL.to_string()],
                vec![names.archive.clone()],
            ));
            graph.declare_signal(SignalDecl::named(names.archive.clone()));

            if request.record_movie {
                if self.options.output_policy == OutputPolicy::AllProduced {
                    graph.declare_output(names.archive.clone());
                }
                graph.push_process(ProcessNode::command(
                    names.render_process.clone(),
                    self.options.render_executable.clone(),
                    vec![names.archive.clone(), names.video.clone()],
                    vec![names.archive],
                    vec![names.video.clone()],
                ));
                graph.declare_signal(SignalDecl::named(names.video.clone()));
                graph.declare_output(names.video);
            } else {
                graph.declare_output(names.archive);
            }
        }

        graph
    }
}
