//! HTTP surface: metrics, health and an index page.

use crate::collector::{ErrorCounter, MetricsProjector, exposition};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tracing::error;

/// State shared by the handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub projector: MetricsProjector,
    pub errors: ErrorCounter,
    /// Health turns unhealthy once the error count exceeds this.
    pub max_errors: u64,
    pub metrics_path: Arc<str>,
}

/// Builds the router: `<metrics_path>`, `/health` and `/`.
pub fn router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.to_string();
    Router::new()
        .route(&metrics_path, get(metrics))
        .route("/health", get(health))
        .route("/", get(index))
        .with_state(state)
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let samples = state.projector.project().await;
    match exposition::render(&samples) {
        Ok(body) => ([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render metrics").into_response()
        }
    }
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.errors.get() > state.max_errors {
        (StatusCode::INTERNAL_SERVER_ERROR, "Unhealthy")
    } else {
        (StatusCode::OK, "OK")
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>vManage Exporter Metrics</title></head>\n\
         <body>\n\
         <h1>Metrics</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}
