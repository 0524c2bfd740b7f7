//! Sweep service
//!
//! Ties the pieces together for one operator action:
//!
//! ```text
//! SweepRequest ──validate──► Stamp ──build──► WorkflowGraph ──check──►
//!     submit ──► StatusHandle ──► Experiment ──record──► Registry
//! ```
//!
//! A failure at any step returns before the registry is touched.

use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use chrono::{DateTime, Utc};
use mdsweep_client::{
    ArtifactProbe, HttpProbe, HttpSubmitter, ProbeStatus, SubmitError, WorkflowSubmitter,
};
use mdsweep_graph::{validate, Stamp, StampIssuer, SweepGraphBuilder, SweepRequest, WorkflowGraph};
use mdsweep_registry::{Experiment, ExperimentRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Preview of the graph a request would submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Stamp the preview was built with
    pub id: Stamp,
    /// Number of temperature points
    pub point_count: u64,
    /// Process names in a valid execution order
    pub execution_order: Vec<String>,
    /// The graph itself
    pub workflow: WorkflowGraph,
}

/// Recent experiments plus the base their artifacts live under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentListing {
    /// Prefix for artifact names
    pub artifact_base: String,
    /// Most recent first
    pub experiments: Vec<Experiment>,
}

/// Completion of every declared output of one experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentProgress {
    /// Experiment id
    pub id: Stamp,
    /// Outputs already reachable
    pub finished: usize,
    /// Declared outputs
    pub total: usize,
    /// `Finished` once every output is reachable
    pub status: ProbeStatus,
}

/// Orchestrates sweep submission and tracking
#[derive(Debug)]
pub struct SweepService {
    builder: SweepGraphBuilder,
    submitter: Arc<dyn WorkflowSubmitter>,
    probe: Arc<dyn ArtifactProbe>,
    registry: ExperimentRegistry,
    stamps: StampIssuer,
    artifact_base: String,
}

impl SweepService {
    /// Assemble from explicit parts
    #[must_use]
    pub fn with_parts(
        config: &SweepConfig,
        submitter: Arc<dyn WorkflowSubmitter>,
        probe: Arc<dyn ArtifactProbe>,
        registry: ExperimentRegistry,
    ) -> Self {
        Self {
            builder: SweepGraphBuilder::new(config.graph.clone()),
            submitter,
            probe,
            registry,
            stamps: StampIssuer::new(),
            artifact_base: config.storage.base_url(),
        }
    }

    /// Assemble HTTP clients and an in-memory registry from `config`
    ///
    /// # Errors
    /// [`SweepError::Config`] for invalid values, [`SweepError::Submission`]
    /// if the service URL is unusable or a client cannot be built.
    pub fn from_config(config: &SweepConfig) -> Result<Self> {
        config.validate()?;

        let submitter = HttpSubmitter::new(config.service_url.as_str(), &config.http)?;
        let probe = HttpProbe::new(&config.http).map_err(SubmitError::Transport)?;
        let registry = ExperimentRegistry::in_memory(config.registry.store_config());

        tracing::info!(
            service_url = config.service_url.as_str(),
            artifact_base = %config.storage.base_url(),
            "Sweep service configured"
        );
        Ok(Self::with_parts(
            config,
            Arc::new(submitter),
            Arc::new(probe),
            registry,
        ))
    }

    /// Defaults offered to the operator
    #[inline]
    #[must_use]
    pub fn default_request(&self) -> SweepRequest {
        SweepRequest::default()
    }

    /// Base URL artifact names are appended to
    #[inline]
    #[must_use]
    pub fn artifact_base(&self) -> &str {
        &self.artifact_base
    }

    /// Underlying registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ExperimentRegistry {
        &self.registry
    }

    /// Build and check the graph `request` would submit, without submitting
    ///
    /// The preview stamp is not reserved.
    ///
    /// # Errors
    /// [`SweepError::Validation`] or [`SweepError::Graph`].
    pub fn plan(&self, request: &SweepRequest) -> Result<SweepPlan> {
        request.validate()?;
        let id = Stamp::from_datetime(Utc::now());
        let workflow = self.builder.build(request, &id);
        let execution_order = validate::execution_order(&workflow)?
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(SweepPlan {
            id,
            point_count: request.point_count(),
            execution_order,
            workflow,
        })
    }

    /// Validate, build, submit and record a sweep
    ///
    /// # Errors
    /// Any [`SweepError`]; the registry is unchanged on error.
    pub async fn submit_sweep(&self, request: SweepRequest) -> Result<Experiment> {
        self.submit_sweep_at(request, Utc::now()).await
    }

    /// [`SweepService::submit_sweep`] with an explicit clock reading
    ///
    /// # Errors
    /// As [`SweepService::submit_sweep`].
    pub async fn submit_sweep_at(
        &self,
        request: SweepRequest,
        now: DateTime<Utc>,
    ) -> Result<Experiment> {
        if let Err(e) = request.validate() {
            tracing::warn!(field = e.field(), error = %e, "Rejected sweep request");
            return Err(e.into());
        }

        let id = self.stamps.issue(now);
        let workflow = self.builder.build(&request, &id);
        validate::check(&workflow)?;
        tracing::info!(
            experiment = %id,
            points = request.point_count(),
            processes = workflow.processes.len(),
            "Submitting sweep"
        );

        let handle = match self.submitter.submit(&workflow).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(experiment = %id, error = %e, "Sweep submission failed");
                return Err(SweepError::Submission(e));
            }
        };

        let experiment = Experiment::new(id, now, &request, handle.as_str(), workflow);
        // a fresh stamp cannot collide; record_new logs if it somehow does
        self.registry.record_new(experiment.clone()).await;
        tracing::info!(experiment = %experiment.id, status_url = %handle, "Sweep submitted");
        Ok(experiment)
    }

    /// Recent experiments with the artifact base
    pub async fn recent_experiments(&self) -> ExperimentListing {
        ExperimentListing {
            artifact_base: self.artifact_base.clone(),
            experiments: self.registry.list_recent().await,
        }
    }

    /// Probe one artifact locator
    pub async fn probe(&self, locator: &str) -> ProbeStatus {
        self.probe.probe(locator).await
    }

    /// Probe every declared output of a recorded experiment
    ///
    /// `None` if the experiment is unknown or expired.
    pub async fn experiment_progress(&self, id: &Stamp) -> Option<ExperimentProgress> {
        let experiment = self.registry.get(id).await?;
        let locators = experiment.artifact_locators(&self.artifact_base);

        let mut finished = 0;
        for locator in &locators {
            if self.probe.probe(locator).await == ProbeStatus::Finished {
                finished += 1;
            }
        }

        let status = match (finished, locators.len()) {
            (_, 0) => ProbeStatus::NotApplicable,
            (done, total) if done == total => ProbeStatus::Finished,
            _ => ProbeStatus::Running,
        };
        Some(ExperimentProgress {
            id: experiment.id,
            finished,
            total: locators.len(),
            status,
        })
    }
}
