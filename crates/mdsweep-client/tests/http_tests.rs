use mdsweep_client::{
    ArtifactProbe, HttpConfig, HttpProbe, HttpSubmitter, ProbeStatus, SubmitError,
    WorkflowSubmitter,
};
use mdsweep_graph::SweepGraphBuilder;
use mdsweep_test_utils::{small_sweep, test_stamp, FakeExecutionService, FakeStorage, SubmitReply};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn graph() -> mdsweep_graph::WorkflowGraph {
    SweepGraphBuilder::default().build(&small_sweep(true), &test_stamp())
}

#[tokio::test]
async fn created_returns_location() {
    let service = FakeExecutionService::start(SubmitReply::Created {
        location: "http://hyperflow.local/apps/7".to_string(),
    });
    let submitter = HttpSubmitter::new(&service.endpoint(), &HttpConfig::default()).unwrap();

    let handle = submitter.submit(&graph()).await.unwrap();
    assert_eq!(handle.as_str(), "http://hyperflow.local/apps/7");
}

#[tokio::test]
async fn posts_the_wire_format() {
    let service = FakeExecutionService::start(SubmitReply::Created {
        location: "/apps/1".to_string(),
    });
    let submitter = HttpSubmitter::new(&service.endpoint(), &HttpConfig::default()).unwrap();
    let graph = graph();
    submitter.submit(&graph).await.unwrap();

    let received = service.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], serde_json::to_value(&graph).unwrap());
    assert_eq!(received[0]["ins"], serde_json::json!(["start"]));
}

#[tokio::test]
async fn relative_location_resolves_against_endpoint() {
    let service = FakeExecutionService::start(SubmitReply::Created {
        location: "/apps/42".to_string(),
    });
    let submitter = HttpSubmitter::new(&service.endpoint(), &HttpConfig::default()).unwrap();

    let handle = submitter.submit(&graph()).await.unwrap();
    assert_eq!(handle.as_str(), format!("{}/apps/42", service.base_url()));
}

#[tokio::test]
async fn ok_instead_of_created_is_rejected() {
    let service = FakeExecutionService::start(SubmitReply::Status(200));
    let submitter = HttpSubmitter::new(&service.endpoint(), &HttpConfig::default()).unwrap();

    let err = submitter.submit(&graph()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Rejected { status: 200 }));
}

#[tokio::test]
async fn server_error_is_rejected() {
    let service = FakeExecutionService::start(SubmitReply::Status(503));
    let submitter = HttpSubmitter::new(&service.endpoint(), &HttpConfig::default()).unwrap();

    let err = submitter.submit(&graph()).await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn missing_location_is_malformed() {
    let service = FakeExecutionService::start(SubmitReply::CreatedWithoutLocation);
    let submitter = HttpSubmitter::new(&service.endpoint(), &HttpConfig::default()).unwrap();

    let err = submitter.submit(&graph()).await.unwrap_err();
    assert!(matches!(err, SubmitError::MalformedResponse(_)));
}

#[tokio::test]
async fn slow_service_times_out() {
    let service = FakeExecutionService::start(SubmitReply::Delayed(Duration::from_secs(3)));
    let config = HttpConfig::default().with_submit_timeout_secs(1);
    let submitter = HttpSubmitter::new(&service.endpoint(), &config).unwrap();

    let err = submitter.submit(&graph()).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // port 9 (discard) on localhost is closed in test environments
    let submitter = HttpSubmitter::new("http://127.0.0.1:9/apps", &HttpConfig::default()).unwrap();
    let err = submitter.submit(&graph()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
}

#[tokio::test]
async fn probe_reports_finished_once_published() {
    let storage = FakeStorage::start();
    let probe = HttpProbe::new(&HttpConfig::default()).unwrap();
    let locator = storage.locator("md-simulation-1700000000-85.tgz");

    assert_eq!(probe.probe(&locator).await, ProbeStatus::Running);
    storage.publish("md-simulation-1700000000-85.tgz");
    assert_eq!(probe.probe(&locator).await, ProbeStatus::Finished);
}

#[tokio::test]
async fn probe_of_unreachable_host_is_running() {
    let probe = HttpProbe::new(&HttpConfig::default().with_probe_timeout_secs(2)).unwrap();
    assert_eq!(
        probe.probe("http://127.0.0.1:9/results/x.tgz").await,
        ProbeStatus::Running
    );
}

#[tokio::test]
async fn probe_of_empty_locator_is_not_applicable() {
    let probe = HttpProbe::new(&HttpConfig::default()).unwrap();
    assert_eq!(probe.probe("").await, ProbeStatus::NotApplicable);
}
