//! HTTP handlers for job submission and result polling.

use super::types::{AnalyzeRequest, AppState, ErrorResponse, SubmitResponse};
use crate::state::JobId;
use crate::url::parse_target_url;
use crate::UrlError;
use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Health check
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Validates the submitted URL, or builds the matching 400 response
///
/// The accepted URL is returned as submitted (trimmed), not re-serialized.
fn validated_url(request: &AnalyzeRequest) -> Result<String, Response> {
    let raw = match &request.url {
        None | Some(Value::Null) => "",
        Some(Value::String(raw)) => raw.as_str(),
        Some(other) => {
            tracing::debug!("Rejected non-string URL: {}", other);
            return Err(bad_request("Invalid URL"));
        }
    };

    match parse_target_url(raw) {
        Ok(_) => Ok(raw.trim().to_string()),
        Err(UrlError::Missing) => Err(bad_request("URL is required")),
        Err(e) => {
            tracing::debug!("Rejected URL {:?}: {}", raw, e);
            Err(bad_request("Invalid URL"))
        }
    }
}

/// Extracts the URL from a request body
///
/// A request without a JSON body has no URL. A body that is not valid JSON
/// for `AnalyzeRequest` has an invalid one. Other rejections (oversized
/// bodies) keep their own status.
fn request_url(payload: Result<Json<AnalyzeRequest>, JsonRejection>) -> Result<String, Response> {
    match payload {
        Ok(Json(request)) => validated_url(&request),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(bad_request("URL is required")),
        Err(rejection @ (JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_))) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(bad_request("Invalid URL"))
        }
        Err(rejection) => Err(rejection.into_response()),
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

/// Accepts a job and returns its id before any network I/O
pub async fn submit_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let url = match request_url(payload) {
        Ok(url) => url,
        Err(response) => return response,
    };

    let job_id = JobId::new();
    if let Err(e) = state.scheduler.store().create(&job_id, state.clock.now()) {
        tracing::error!(job_id = %job_id, "Failed to create job: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to create job")),
        )
            .into_response();
    }

    tracing::info!(job_id = %job_id, url = %url, "Analysis requested");
    state.scheduler.submit(job_id.clone(), url);

    Json(SubmitResponse {
        job_id: job_id.to_string(),
    })
    .into_response()
}

/// Returns the current state of a job
pub async fn result_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.scheduler.store().get(&JobId::from(id)) {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Job not found"))).into_response(),
    }
}

/// Runs the analysis inline and returns the result
pub async fn analyze_sync_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let url = match request_url(payload) {
        Ok(url) => url,
        Err(response) => return response,
    };

    tracing::info!(url = %url, "Synchronous analysis requested");
    match state.scheduler.analyze_now(&url).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::warn!(url = %url, "Analysis error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to analyze page")),
            )
                .into_response()
        }
    }
}

/// Logs every incoming request
pub async fn log_request(request: Request, next: Next) -> Response {
    tracing::debug!("{} {}", request.method(), request.uri());
    next.run(request).await
}
