//! Gateway request and response bodies.

use crate::pipeline::{Clock, Scheduler};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for the gateway handlers
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Scheduler,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(scheduler: Scheduler, clock: Arc<dyn Clock>) -> Self {
        Self { scheduler, clock }
    }
}

/// Body of `POST /analyze` and `POST /analyze/sync`
///
/// `url` is kept untyped so a non-string value reaches URL validation
/// instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<serde_json::Value>,
}

/// Response of `POST /analyze`
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "jobId")]
    pub job_id: String,
}

/// Error body returned with every non-2xx JSON response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
