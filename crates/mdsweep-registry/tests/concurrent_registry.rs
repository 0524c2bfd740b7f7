use mdsweep_graph::Stamp;
use mdsweep_registry::{ExperimentRegistry, StoreConfig};
use mdsweep_test_utils::create_experiment;
use std::collections::HashSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_records_are_each_indexed_once() {
    let registry = ExperimentRegistry::in_memory(StoreConfig::default());

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .record_new(create_experiment(&format!("17000000{i:02}")))
                    .await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert!(result.unwrap());
    }

    let listed = registry.list_recent().await;
    assert_eq!(listed.len(), 32);
    let unique: HashSet<_> = listed.iter().map(|e| e.id.clone()).collect();
    assert_eq!(unique.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_duplicates_record_exactly_once() {
    let registry = ExperimentRegistry::in_memory(StoreConfig::default());

    let attempts = (0..16).map(|_| {
        let registry = registry.clone();
        async move { registry.record_new(create_experiment("1700000000")).await }
    });
    let outcomes = futures::future::join_all(attempts).await;

    assert_eq!(outcomes.iter().filter(|won| **won).count(), 1);
    assert_eq!(registry.list_recent().await.len(), 1);
    assert!(registry.contains(&Stamp::new("1700000000")).await);
}

#[tokio::test]
async fn index_keeps_most_recent_within_limit() {
    let registry = ExperimentRegistry::in_memory(StoreConfig::default().with_max_index_len(3));
    for id in ["1", "2", "3", "4", "5"] {
        assert!(registry.record_new(create_experiment(id)).await);
    }

    let ids: Vec<_> = registry
        .list_recent()
        .await
        .into_iter()
        .map(|e| e.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["5", "4", "3"]);
    // evicted from the index, still recorded
    assert!(registry.contains(&Stamp::new("1")).await);
}
