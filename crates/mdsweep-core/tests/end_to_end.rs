use mdsweep_core::prelude::*;
use mdsweep_core::{StorageConfig, SweepConfig};
use mdsweep_client::SubmitError;
use mdsweep_test_utils::{small_sweep, FakeExecutionService, FakeStorage, SubmitReply};
use std::io::Write;

fn config_for(service: &FakeExecutionService) -> SweepConfig {
    SweepConfig::default().with_service_url(service.endpoint())
}

#[tokio::test]
async fn submitted_sweep_is_listed_and_probed() {
    let service = FakeExecutionService::start(SubmitReply::Created {
        location: "/apps/9".to_string(),
    });
    let sweeps = SweepService::from_config(&config_for(&service)).unwrap();

    let experiment = sweeps.submit_sweep(small_sweep(true)).await.unwrap();
    assert_eq!(experiment.status_url, format!("{}/apps/9", service.base_url()));
    assert_eq!(experiment.workflow.processes.len(), 6);

    let received = service.received();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0],
        serde_json::to_value(&experiment.workflow).unwrap()
    );

    let listing = sweeps.recent_experiments().await;
    assert_eq!(listing.experiments.len(), 1);
    assert_eq!(listing.experiments[0].id, experiment.id);
}

#[tokio::test]
async fn rejected_sweep_is_not_listed() {
    let service = FakeExecutionService::start(SubmitReply::Status(500));
    let sweeps = SweepService::from_config(&config_for(&service)).unwrap();

    let err = sweeps.submit_sweep(small_sweep(false)).await.unwrap_err();
    assert!(matches!(
        err,
        SweepError::Submission(SubmitError::Rejected { status: 500 })
    ));
    assert_eq!(err.http_status(), 502);
    assert!(sweeps.recent_experiments().await.experiments.is_empty());
}

#[tokio::test]
async fn progress_follows_published_artifacts() {
    let service = FakeExecutionService::start(SubmitReply::Created {
        location: "/apps/1".to_string(),
    });
    let storage = FakeStorage::start();
    let config = config_for(&service).with_storage(StorageConfig {
        endpoint: Some(storage.base_url()),
        ..StorageConfig::default()
    });
    let sweeps = SweepService::from_config(&config).unwrap();
    let experiment = sweeps.submit_sweep(small_sweep(false)).await.unwrap();

    let progress = sweeps.experiment_progress(&experiment.id).await.unwrap();
    assert_eq!((progress.finished, progress.total), (0, 3));
    assert_eq!(progress.status, ProbeStatus::Running);

    let first = &experiment.workflow.outputs[0];
    assert_eq!(sweeps.probe(&storage.locator(first)).await, ProbeStatus::Running);
    storage.publish(first);
    assert_eq!(sweeps.probe(&storage.locator(first)).await, ProbeStatus::Finished);

    for name in &experiment.workflow.outputs {
        storage.publish(name);
    }
    let progress = sweeps.experiment_progress(&experiment.id).await.unwrap();
    assert_eq!(progress.finished, 3);
    assert_eq!(progress.status, ProbeStatus::Finished);
}

#[tokio::test]
async fn config_file_drives_the_service() {
    let service = FakeExecutionService::start(SubmitReply::Created {
        location: "/apps/3".to_string(),
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "service_url = \"{}\"\n\n[graph]\noutput_policy = \"sinks_only\"\n\n[storage]\nbucket = \"lab\"",
        service.endpoint()
    )
    .unwrap();

    let config = SweepConfig::load(file.path()).unwrap();
    let sweeps = SweepService::from_config(&config).unwrap();
    assert_eq!(
        sweeps.artifact_base(),
        "http://s3.eu-central-1.amazonaws.com/lab/results/"
    );

    let experiment = sweeps.submit_sweep(small_sweep(true)).await.unwrap();
    assert!(experiment
        .workflow
        .outputs
        .iter()
        .all(|name| name.ends_with(".avi")));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SweepConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, mdsweep_core::ConfigError::Io { .. }));
}
