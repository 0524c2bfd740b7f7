//! Expiring experiment storage using moka
//!
//! The index and the records live in one cache and expire independently, so
//! an id can stay in the index after its record is gone (and the other way
//! round).

use crate::experiment::Experiment;
use async_trait::async_trait;
use mdsweep_graph::Stamp;
use moka::future::Cache;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default lifetime of every entry (one hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default maximum number of cached entries
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Default length of the recent-experiments index
pub const DEFAULT_MAX_INDEX_LEN: usize = 100;

/// Storage seam used by the registry
///
/// A missing or expired entry is never an error; lookups return `None` or
/// skip it.
#[async_trait]
pub trait ExperimentStore: Send + Sync + Debug {
    /// Insert `experiment` unless its id is already present
    ///
    /// Returns whether the insert happened.
    async fn insert_if_absent(&self, experiment: Experiment) -> bool;

    /// Look up one record
    async fn get(&self, id: &Stamp) -> Option<Experiment>;

    /// Look up several records, skipping missing ones, in `ids` order
    async fn get_many(&self, ids: &[Stamp]) -> Vec<Experiment> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(experiment) = self.get(id).await {
                found.push(experiment);
            }
        }
        found
    }

    /// Current index, most recent first (empty when absent)
    async fn index(&self) -> Vec<Stamp>;

    /// Atomically put `id` at the front of the index
    ///
    /// No-op (returns `false`) if `id` is already indexed.
    async fn prepend_to_index(&self, id: &Stamp) -> bool;
}

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lifetime of each entry
    pub ttl: Duration,
    /// Maximum cached entries
    pub max_entries: u64,
    /// Maximum ids kept in the index
    pub max_index_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_index_len: DEFAULT_MAX_INDEX_LEN,
        }
    }
}

impl StoreConfig {
    /// With entry lifetime
    #[inline]
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// With index length limit
    #[inline]
    #[must_use]
    pub fn with_max_index_len(mut self, len: usize) -> Self {
        self.max_index_len = len;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Index,
    Experiment(Stamp),
}

#[derive(Debug, Clone)]
enum CacheValue {
    Index(Arc<Vec<Stamp>>),
    Experiment(Arc<Experiment>),
}

/// [`ExperimentStore`] backed by a moka cache with a time-to-live
#[derive(Debug, Clone)]
pub struct MokaStore {
    inner: Cache<CacheKey, CacheValue>,
    index_lock: Arc<Mutex<()>>,
    max_index_len: usize,
}

impl MokaStore {
    /// Create a store
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(config.ttl)
                .build(),
            index_lock: Arc::new(Mutex::new(())),
            max_index_len: config.max_index_len,
        }
    }

    /// Approximate entry count (index included)
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Drop every entry
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    async fn read_index(&self) -> Vec<Stamp> {
        match self.inner.get(&CacheKey::Index).await {
            Some(CacheValue::Index(ids)) => ids.as_ref().clone(),
            _ => Vec::new(),
        }
    }
}

impl Default for MokaStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[async_trait]
impl ExperimentStore for MokaStore {
    async fn insert_if_absent(&self, experiment: Experiment) -> bool {
        let key = CacheKey::Experiment(experiment.id.clone());
        let value = CacheValue::Experiment(Arc::new(experiment));
        self.inner
            .entry(key)
            .or_insert_with(async move { value })
            .await
            .is_fresh()
    }

    async fn get(&self, id: &Stamp) -> Option<Experiment> {
        match self.inner.get(&CacheKey::Experiment(id.clone())).await {
            Some(CacheValue::Experiment(experiment)) => Some(experiment.as_ref().clone()),
            _ => None,
        }
    }

    async fn index(&self) -> Vec<Stamp> {
        self.read_index().await
    }

    async fn prepend_to_index(&self, id: &Stamp) -> bool {
        // read-modify-write of the index is serialized here
        let _guard = self.index_lock.lock().await;

        let mut ids = self.read_index().await;
        if ids.contains(id) {
            return false;
        }
        ids.insert(0, id.clone());
        ids.truncate(self.max_index_len);

        self.inner
            .insert(CacheKey::Index, CacheValue::Index(Arc::new(ids)))
            .await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mdsweep_graph::{SweepRequest, WorkflowGraph};

    fn experiment(id: &str) -> Experiment {
        Experiment::new(
            Stamp::new(id),
            Utc::now(),
            &SweepRequest::default(),
            "http://hf/apps/1",
            WorkflowGraph::with_start(),
        )
    }

    #[tokio::test]
    async fn insert_if_absent_never_overwrites() {
        let store = MokaStore::default();
        assert!(store.insert_if_absent(experiment("1")).await);

        let mut second = experiment("1");
        second.status_url = "http://elsewhere".to_string();
        assert!(!store.insert_if_absent(second).await);

        let stored = store.get(&Stamp::new("1")).await.unwrap();
        assert_eq!(stored.status_url, "http://hf/apps/1");
    }

    #[tokio::test]
    async fn missing_index_is_empty() {
        let store = MokaStore::default();
        assert!(store.index().await.is_empty());
    }

    #[tokio::test]
    async fn prepend_puts_newest_first() {
        let store = MokaStore::default();
        store.prepend_to_index(&Stamp::new("1")).await;
        store.prepend_to_index(&Stamp::new("2")).await;
        assert_eq!(store.index().await, vec![Stamp::new("2"), Stamp::new("1")]);
    }

    #[tokio::test]
    async fn prepend_is_idempotent() {
        let store = MokaStore::default();
        assert!(store.prepend_to_index(&Stamp::new("1")).await);
        assert!(!store.prepend_to_index(&Stamp::new("1")).await);
        assert_eq!(store.index().await.len(), 1);
    }

    #[tokio::test]
    async fn index_is_bounded() {
        let store = MokaStore::new(StoreConfig::default().with_max_index_len(2));
        for id in ["1", "2", "3"] {
            store.prepend_to_index(&Stamp::new(id)).await;
        }
        assert_eq!(store.index().await, vec![Stamp::new("3"), Stamp::new("2")]);
    }

    #[tokio::test]
    async fn get_many_skips_missing() {
        let store = MokaStore::default();
        store.insert_if_absent(experiment("a")).await;
        store.insert_if_absent(experiment("c")).await;

        let ids = [Stamp::new("c"), Stamp::new("b"), Stamp::new("a")];
        let found: Vec<String> = store
            .get_many(&ids)
            .await
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(found, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn entries_expire() {
        let store = MokaStore::new(StoreConfig::default().with_ttl(Duration::from_millis(50)));
        store.insert_if_absent(experiment("1")).await;
        store.prepend_to_index(&Stamp::new("1")).await;

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(store.get(&Stamp::new("1")).await.is_none());
        assert!(store.index().await.is_empty());
    }
}
