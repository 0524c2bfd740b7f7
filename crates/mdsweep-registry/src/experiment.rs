//! Experiment records
//!
//! An [`Experiment`] is written once, when its sweep is accepted by the
//! execution service, and never updated afterwards. Live status is computed
//! on demand from the artifact locators.

use chrono::{DateTime, Utc};
use mdsweep_graph::naming::{experiment_archive, experiment_video};
use mdsweep_graph::{format_real, Stamp, SweepRequest, WorkflowGraph};
use serde::{Deserialize, Serialize};

/// Status label stored at submission time
pub const STATUS_RUNNING: &str = "Running";

/// Display format of the submission time
const SUBMITTED_AT_FORMAT: &str = "%b %e %H:%M:%S";

/// Record of one submitted sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Stamp shared with every artifact of the sweep
    pub id: Stamp,
    /// Human-readable submission time
    pub submitted_at: String,
    /// Molecule count
    pub molecules: String,
    /// First temperature
    pub min_temperature: String,
    /// Last temperature
    pub max_temperature: String,
    /// Temperature increment
    pub step_temperature: String,
    /// Simulated seconds
    pub simulation_time: String,
    /// Whether movies were requested
    pub record_movie: bool,
    /// Status label at submission
    pub status: String,
    /// Experiment archive file name
    pub archive: String,
    /// Experiment video file name
    pub video: String,
    /// Status handle returned by the execution service
    pub status_url: String,
    /// Graph that was submitted
    pub workflow: WorkflowGraph,
}

impl Experiment {
    /// Record a sweep accepted at `submitted_at`
    #[must_use]
    pub fn new(
        id: Stamp,
        submitted_at: DateTime<Utc>,
        request: &SweepRequest,
        status_url: impl Into<String>,
        workflow: WorkflowGraph,
    ) -> Self {
        Self {
            archive: experiment_archive(&id),
            video: experiment_video(&id),
            id,
            submitted_at: submitted_at.format(SUBMITTED_AT_FORMAT).to_string(),
            molecules: request.molecules.to_string(),
            min_temperature: format_real(request.min_temperature),
            max_temperature: format_real(request.max_temperature),
            step_temperature: format_real(request.step_temperature),
            simulation_time: format_real(request.simulation_end_time),
            record_movie: request.record_movie,
            status: STATUS_RUNNING.to_string(),
            status_url: status_url.into(),
            workflow,
        }
    }

    /// Locators of every declared output under `base`
    ///
    /// `base` is used verbatim as a prefix, so it should end with `/`.
    #[must_use]
    pub fn artifact_locators(&self, base: &str) -> Vec<String> {
        self.workflow
            .outputs
            .iter()
            .map(|name| format!("{base}{name}"))
            .collect()
    }
}
