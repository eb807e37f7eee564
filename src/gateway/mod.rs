//! HTTP gateway in front of the job pipeline.
//!
//! Endpoints:
//! - `GET /` - health check
//! - `POST /analyze` - queue an analysis, returns `{ "jobId" }` immediately
//! - `GET /result/:id` - poll a job
//! - `POST /analyze/sync` - analyze inline and return the result

mod handlers;
mod types;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::future::Future;
use tokio::net::TcpListener;

use crate::ProbeError;
use handlers::{analyze_sync_handler, health_handler, log_request, result_handler, submit_handler};
pub use types::{AnalyzeRequest, AppState, ErrorResponse, SubmitResponse};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Builds the gateway router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/analyze", post(submit_handler))
        .route("/analyze/sync", post(analyze_sync_handler))
        .route("/result/:id", get(result_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Serves the gateway on `listener` until `shutdown` completes
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ProbeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on http://{}/", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ProbeError::Server(e.to_string()))
}
