//! Testing utilities for the mdsweep workspace
//!
//! Shared fixtures plus in-process fakes of the two external services:
//! - [`FakeExecutionService`]: accepts `POST /apps` and answers as told
//! - [`FakeStorage`]: serves `GET /results/<name>` for published artifacts

#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use mdsweep_graph::{Stamp, SweepGraphBuilder, SweepRequest};
use mdsweep_registry::Experiment;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;
use warp::Reply;

pub const TEST_STAMP: &str = "1700000000";

pub fn test_stamp() -> Stamp {
    Stamp::new(TEST_STAMP)
}

/// `85..=87 step 1`, 1000 molecules, 5.5 s
pub fn small_sweep(record_movie: bool) -> SweepRequest {
    SweepRequest::default()
        .with_molecules(1000)
        .with_range(85.0, 87.0, 1.0)
        .with_simulation_end_time(5.5)
        .with_movie(record_movie)
}

pub fn create_experiment(id: &str) -> Experiment {
    let stamp = Stamp::new(id);
    let request = small_sweep(false);
    let graph = SweepGraphBuilder::default().build(&request, &stamp);
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    Experiment::new(stamp, at, &request, format!("http://hf/apps/{id}"), graph)
}

/// How the fake execution service answers a submission
#[derive(Debug, Clone)]
pub enum SubmitReply {
    /// 201 with the given `Location`
    Created { location: String },
    /// 201 without `Location`
    CreatedWithoutLocation,
    /// Any other status
    Status(u16),
    /// Answer 201 only after sleeping
    Delayed(Duration),
}

fn submit_response(reply: &SubmitReply) -> warp::reply::Response {
    match reply {
        SubmitReply::Created { location } => warp::reply::with_status(
            warp::reply::with_header(warp::reply(), "Location", location.as_str()),
            StatusCode::CREATED,
        )
        .into_response(),
        SubmitReply::CreatedWithoutLocation | SubmitReply::Delayed(_) => {
            warp::reply::with_status(warp::reply(), StatusCode::CREATED).into_response()
        }
        SubmitReply::Status(code) => warp::reply::with_status(
            warp::reply(),
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        )
        .into_response(),
    }
}

/// In-process stand-in for the workflow execution service
#[derive(Debug, Clone)]
pub struct FakeExecutionService {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakeExecutionService {
    /// Start listening on an ephemeral port
    pub fn start(reply: SubmitReply) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();

        let route = warp::post()
            .and(warp::path("apps"))
            .and(warp::path::end())
            .and(warp::body::json())
            .and_then(move |body: Value| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    sink.lock().push(body);
                    if let SubmitReply::Delayed(delay) = reply {
                        tokio::time::sleep(delay).await;
                    }
                    Ok::<_, Infallible>(submit_response(&reply))
                }
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, received }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/apps", self.addr)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Bodies received so far
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().clone()
    }
}

/// In-process stand-in for the artifact store
#[derive(Debug, Clone)]
pub struct FakeStorage {
    addr: SocketAddr,
    available: Arc<Mutex<HashSet<String>>>,
}

impl FakeStorage {
    /// Start listening on an ephemeral port
    pub fn start() -> Self {
        let available: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let lookup = available.clone();

        let route = warp::get()
            .and(warp::path("results"))
            .and(warp::path::param::<String>())
            .and(warp::path::end())
            .map(move |name: String| {
                let status = if lookup.lock().contains(&name) {
                    StatusCode::OK
                } else {
                    StatusCode::NOT_FOUND
                };
                warp::reply::with_status(warp::reply(), status)
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, available }
    }

    /// Base URL artifacts are published under (ends with `/`)
    pub fn base_url(&self) -> String {
        format!("http://{}/results/", self.addr)
    }

    pub fn locator(&self, name: &str) -> String {
        format!("{}{name}", self.base_url())
    }

    /// Make `name` reachable
    pub fn publish(&self, name: &str) {
        self.available.lock().insert(name.to_string());
    }
}
