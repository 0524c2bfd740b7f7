//! Experiment registry
//!
//! Records submitted sweeps and lists the recent ones. Each id moves through
//! `absent → recorded → expired`; a recorded experiment is never rewritten.

use crate::experiment::Experiment;
use crate::store::{ExperimentStore, MokaStore, StoreConfig};
use mdsweep_graph::Stamp;
use std::sync::Arc;

/// Registry of submitted experiments over an injected [`ExperimentStore`]
#[derive(Debug, Clone)]
pub struct ExperimentRegistry {
    store: Arc<dyn ExperimentStore>,
}

impl ExperimentRegistry {
    /// Create a registry over `store`
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn ExperimentStore>) -> Self {
        Self { store }
    }

    /// Registry over an in-memory moka store
    #[must_use]
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::new(Arc::new(MokaStore::new(config)))
    }

    /// Record a newly submitted experiment
    ///
    /// Returns `false`, leaving both record and index untouched, when the id
    /// is already recorded.
    pub async fn record_new(&self, experiment: Experiment) -> bool {
        let id = experiment.id.clone();
        if !self.store.insert_if_absent(experiment).await {
            tracing::warn!(experiment = %id, "Experiment already recorded, ignoring");
            return false;
        }
        self.store.prepend_to_index(&id).await;
        tracing::info!(experiment = %id, "Recorded experiment");
        true
    }

    /// Recent experiments, most recent first
    ///
    /// Ids whose record has expired are skipped; an expired index gives an
    /// empty list.
    pub async fn list_recent(&self) -> Vec<Experiment> {
        let ids = self.store.index().await;
        let experiments = self.store.get_many(&ids).await;
        if experiments.len() < ids.len() {
            tracing::debug!(
                indexed = ids.len(),
                live = experiments.len(),
                "Skipped expired experiments"
            );
        }
        experiments
    }

    /// Look up one experiment
    pub async fn get(&self, id: &Stamp) -> Option<Experiment> {
        self.store.get(id).await
    }

    /// Whether `id` is currently recorded
    pub async fn contains(&self, id: &Stamp) -> bool {
        self.store.get(id).await.is_some()
    }
}

impl Default for ExperimentRegistry {
    fn default() -> Self {
        Self::in_memory(StoreConfig::default())
    }
}
