//! HTTP surface of the `external.metrics.k8s.io/v1beta1` API group.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::info;
use tracing::warn;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

use crate::provider::APIResourceList;
use crate::provider::ExternalMetricsProvider;
use crate::Error;
use crate::QueryError;
use crate::Result;

/// Failure body, shaped like a Kubernetes `Status`
#[derive(Debug, Serialize)]
struct Status {
    kind: &'static str,
    status: &'static str,
    message: String,
    code: u16,
}

pub fn routes(
    provider: Arc<ExternalMetricsProvider>
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("apis" / "external.metrics.k8s.io" / "v1beta1"))
        .and(with_provider(provider.clone()))
        .map(list_handler);

    let value = warp::get()
        .and(warp::path!("apis" / "external.metrics.k8s.io" / "v1beta1" / "namespaces" / String / String))
        .and(with_provider(provider.clone()))
        .and_then(value_handler);

    let query = warp::get()
        .and(warp::path!(
            "apis" / "external.metrics.k8s.io" / "v1beta1" / "namespaces" / String / String / "query"
        ))
        .and(with_provider(provider))
        .map(query_handler);

    list.or(value).unify().or(query).unify()
}

/// Serves the API until `shutdown` fires
pub async fn start_server(
    listen_address: SocketAddr,
    provider: Arc<ExternalMetricsProvider>,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let (addr, server) = warp::serve(routes(provider))
        .try_bind_with_graceful_shutdown(listen_address, async move {
            let _ = shutdown_signal.changed().await;
        })
        .map_err(|e| Error::Fatal(format!("failed to bind {}: {}", listen_address, e)))?;

    info!("external metrics API listening on {}", addr);
    server.await;
    info!("external metrics API stopped");
    Ok(())
}

fn with_provider(
    provider: Arc<ExternalMetricsProvider>
) -> impl Filter<Extract = (Arc<ExternalMetricsProvider>,), Error = Infallible> + Clone {
    warp::any().map(move || provider.clone())
}

fn list_handler(provider: Arc<ExternalMetricsProvider>) -> Response {
    let metrics = provider.list_all_external_metrics();
    warp::reply::json(&APIResourceList::from_metrics(&metrics)).into_response()
}

async fn value_handler(
    namespace: String,
    metric: String,
    provider: Arc<ExternalMetricsProvider>,
) -> std::result::Result<Response, Rejection> {
    match provider.get_external_metric(&namespace, &metric).await {
        Ok(list) => Ok(warp::reply::json(&list).into_response()),
        Err(e) => Ok(error_reply(&e)),
    }
}

fn query_handler(
    namespace: String,
    metric: String,
    provider: Arc<ExternalMetricsProvider>,
) -> Response {
    match provider.get_metric_request(&namespace, &metric) {
        Ok(request) => warp::reply::json(&request).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// HTTP status a read path error is reported with
pub fn status_code(err: &Error) -> StatusCode {
    match err {
        Error::Query(QueryError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Error::Query(QueryError::Backend(_)) => StatusCode::BAD_GATEWAY,
        Error::Query(QueryError::BackendUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Query(QueryError::InvalidQuery(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(err: &Error) -> Response {
    let code = status_code(err);
    let message = match err {
        Error::Query(QueryError::NotFound { .. }) => "no metric query found".to_string(),
        other => other.to_string(),
    };
    warn!("request failed with {}: {}", code, err);

    let body = Status {
        kind: "Status",
        status: "Failure",
        message,
        code: code.as_u16(),
    };
    warp::reply::with_status(warp::reply::json(&body), code).into_response()
}
