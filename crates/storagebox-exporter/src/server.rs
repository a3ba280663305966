//! HTTP exposition endpoint.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use storagebox_metrics::{CONTENT_TYPE, Registry, render_prometheus};

/// Shared state for the exposition handlers.
#[derive(Clone)]
pub struct ExpositionState {
    pub registry: Registry,
    pub metrics_path: Arc<str>,
}

/// Build the exporter router: the metrics route plus a landing page at `/`.
///
/// `metrics_path` must start with `/`.
pub fn build_router(registry: Registry, metrics_path: &str) -> Router {
    let state = ExpositionState {
        registry,
        metrics_path: Arc::from(metrics_path),
    };

    let router = Router::new().route(metrics_path, get(prometheus_metrics));
    let router = if metrics_path == "/" {
        router
    } else {
        router.route("/", get(index))
    };
    router.with_state(state)
}

/// GET <metrics path>: current registry contents in Prometheus text format.
pub async fn prometheus_metrics(State(state): State<ExpositionState>) -> impl IntoResponse {
    let families = state.registry.gather().await;
    let body = render_prometheus(&families);
    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

async fn index(State(state): State<ExpositionState>) -> Html<String> {
    Html(format!(
        "<html>\n<head><title>Storage Box Exporter</title></head>\n<body>\n\
         <h1>Storage Box Exporter</h1>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n</html>\n",
        path = state.metrics_path
    ))
}
