//! Operator JSON API
//!
//! ```text
//! GET  /sweeps/defaults                  default request
//! POST /sweeps                           submit, 201 + experiment
//! POST /sweeps/plan                      preview graph, nothing submitted
//! GET  /experiments                      recent experiments
//! GET  /experiments/status?resource=     probe one artifact
//! GET  /experiments/<id>/progress        probe every output of one experiment
//! ```

use mdsweep_client::StatusReply;
use mdsweep_core::{SweepError, SweepService};
use mdsweep_graph::{Stamp, SweepRequest};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// Largest accepted request body
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Error body of every non-2xx answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Offending request field, for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    fn reply(status: StatusCode, error: impl Into<String>) -> Response {
        let body = Self {
            error: error.into(),
            field: None,
        };
        warp::reply::with_status(warp::reply::json(&body), status).into_response()
    }
}

impl From<&SweepError> for ErrorBody {
    fn from(err: &SweepError) -> Self {
        Self {
            error: err.to_string(),
            field: match err {
                SweepError::Validation(e) => Some(e.field().to_string()),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    #[serde(default)]
    resource: String,
}

/// All routes, rejections recovered into JSON errors
pub fn routes(
    service: Arc<SweepService>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let defaults = warp::get()
        .and(warp::path!("sweeps" / "defaults"))
        .and(with_service(service.clone()))
        .map(|service: Arc<SweepService>| warp::reply::json(&service.default_request()));

    let plan = warp::post()
        .and(warp::path!("sweeps" / "plan"))
        .and(json_body())
        .and(with_service(service.clone()))
        .map(plan_sweep);

    let submit = warp::post()
        .and(warp::path!("sweeps"))
        .and(json_body())
        .and(with_service(service.clone()))
        .and_then(submit_sweep);

    let list = warp::get()
        .and(warp::path!("experiments"))
        .and(with_service(service.clone()))
        .and_then(list_experiments);

    let status = warp::get()
        .and(warp::path!("experiments" / "status"))
        .and(warp::query::<StatusQuery>())
        .and(with_service(service.clone()))
        .and_then(artifact_status);

    let progress = warp::get()
        .and(warp::path!("experiments" / String / "progress"))
        .and(with_service(service))
        .and_then(experiment_progress);

    defaults
        .or(plan)
        .or(submit)
        .or(list)
        .or(status)
        .or(progress)
        .with(warp::trace::request())
        .recover(handle_rejection)
}

fn with_service(
    service: Arc<SweepService>,
) -> impl Filter<Extract = (Arc<SweepService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn json_body() -> impl Filter<Extract = (SweepRequest,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn error_response(err: &SweepError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status(warp::reply::json(&ErrorBody::from(err)), status).into_response()
}

fn plan_sweep(request: SweepRequest, service: Arc<SweepService>) -> Response {
    match service.plan(&request) {
        Ok(plan) => warp::reply::json(&plan).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn submit_sweep(
    request: SweepRequest,
    service: Arc<SweepService>,
) -> Result<Response, Infallible> {
    Ok(match service.submit_sweep(request).await {
        Ok(experiment) => {
            warp::reply::with_status(warp::reply::json(&experiment), StatusCode::CREATED)
                .into_response()
        }
        Err(e) => error_response(&e),
    })
}

async fn list_experiments(service: Arc<SweepService>) -> Result<Response, Infallible> {
    let listing = service.recent_experiments().await;
    Ok(warp::reply::json(&listing).into_response())
}

async fn artifact_status(
    query: StatusQuery,
    service: Arc<SweepService>,
) -> Result<Response, Infallible> {
    let status = service.probe(&query.resource).await;
    Ok(warp::reply::json(&StatusReply::from(status)).into_response())
}

async fn experiment_progress(
    id: String,
    service: Arc<SweepService>,
) -> Result<Response, Infallible> {
    let id = Stamp::new(id);
    Ok(match service.experiment_progress(&id).await {
        Some(progress) => warp::reply::json(&progress).into_response(),
        None => ErrorBody::reply(StatusCode::NOT_FOUND, format!("unknown experiment {id}")),
    })
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let response = if err.is_not_found() {
        ErrorBody::reply(StatusCode::NOT_FOUND, "not found")
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        ErrorBody::reply(StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        ErrorBody::reply(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        ErrorBody::reply(StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected application/json")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ErrorBody::reply(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else {
        tracing::error!(rejection = ?err, "Unhandled rejection");
        ErrorBody::reply(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    };
    Ok(response)
}
