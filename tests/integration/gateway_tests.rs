use crate::common::{fast_fetcher_config, mount_page, GOOGLE_CONTAINER_PAGE};
use gtm_probe::gateway::{self, AppState, ErrorResponse, SubmitResponse, MAX_BODY_BYTES};
use gtm_probe::pipeline::{HttpFetcher, Scheduler, SystemClock};
use gtm_probe::storage::MemoryJobStore;
use gtm_probe::Analyzer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

/// Starts the gateway on an ephemeral port and returns its base URL
async fn start_gateway() -> String {
    let store = Arc::new(MemoryJobStore::new());
    let fetcher = HttpFetcher::from_config(&fast_fetcher_config()).unwrap();
    let scheduler = Scheduler::new(store, Arc::new(fetcher), Arc::new(Analyzer::new()));
    let state = AppState::new(scheduler, Arc::new(SystemClock));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        gateway::serve(listener, state, std::future::pending())
            .await
            .unwrap();
    });

    format!("http://{}", addr)
}

async fn poll_until_finished(client: &reqwest::Client, base: &str, job_id: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let body: Value = client
                .get(format!("{}/result/{}", base, job_id))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            if body["status"] != "pending" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("job did not finish in time")
}

#[tokio::test]
async fn test_health_check() {
    let base = start_gateway().await;

    let response = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_submit_requires_url() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "URL is required");
}

#[tokio::test]
async fn test_submit_rejects_invalid_url() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze", base))
        .json(&json!({ "url": "example.com/no-scheme" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "Invalid URL");
}

#[tokio::test]
async fn test_submit_and_poll_result() {
    let site = MockServer::start().await;
    mount_page(&site, "/", 200, GOOGLE_CONTAINER_PAGE).await;

    let base = start_gateway().await;
    let client = reqwest::Client::new();
    let target = format!("{}/", site.uri());

    let response = client
        .post(format!("{}/analyze", base))
        .json(&json!({ "url": target }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let submitted: SubmitResponse = response.json().await.unwrap();
    assert!(!submitted.job_id.is_empty());

    let body = poll_until_finished(&client, &base, &submitted.job_id).await;
    assert_eq!(
        body,
        json!({
            "status": "done",
            "result": {
                "url": target,
                "gtmDomain": "www.googletagmanager.com",
                "isProxified": false,
                "isGTMFound": true
            }
        })
    );
}

#[tokio::test]
async fn test_submit_without_json_body() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze", base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "URL is required");
}

#[tokio::test]
async fn test_submit_rejects_non_string_url() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze", base))
        .json(&json!({ "url": 123 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "Invalid URL");
}

#[tokio::test]
async fn test_submit_rejects_malformed_json() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze", base))
        .header("content-type", "application/json")
        .body(r#"{"url": "https://example.com/""#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "Invalid URL");
}

#[tokio::test]
async fn test_result_echoes_submitted_url() {
    let site = MockServer::start().await;
    mount_page(&site, "/", 200, GOOGLE_CONTAINER_PAGE).await;

    let base = start_gateway().await;
    let client = reqwest::Client::new();
    // Uppercase scheme and no trailing slash
    let target = format!("HTTP://{}", site.address());

    let submitted: SubmitResponse = client
        .post(format!("{}/analyze", base))
        .json(&json!({ "url": target }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let body = poll_until_finished(&client, &base, &submitted.job_id).await;
    assert_eq!(body["status"], "done");
    assert_eq!(body["result"]["url"], target.as_str());
}

#[tokio::test]
async fn test_sync_analysis_without_json_body() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze/sync", base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "URL is required");
}

#[tokio::test]
async fn test_failed_job_reports_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let submitted: SubmitResponse = client
        .post(format!("{}/analyze", base))
        .json(&json!({ "url": format!("http://127.0.0.1:{}/", port) }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let body = poll_until_finished(&client, &base, &submitted.job_id).await;
    assert_eq!(body["status"], "error");
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let base = start_gateway().await;

    let response = reqwest::get(format!("{}/result/does-not-exist", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "Job not found");
}

#[tokio::test]
async fn test_job_ids_are_unique() {
    let site = MockServer::start().await;
    mount_page(&site, "/", 200, "<html></html>").await;

    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let mut ids = std::collections::HashSet::new();
    for _ in 0..10 {
        let submitted: SubmitResponse = client
            .post(format!("{}/analyze", base))
            .json(&json!({ "url": format!("{}/", site.uri()) }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.insert(submitted.job_id);
    }
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn test_sync_analysis() {
    let site = MockServer::start().await;
    mount_page(&site, "/", 200, GOOGLE_CONTAINER_PAGE).await;

    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze/sync", base))
        .json(&json!({ "url": format!("{}/", site.uri()) }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["isGTMFound"], true);
    assert_eq!(body["gtmDomain"], "www.googletagmanager.com");
}

#[tokio::test]
async fn test_sync_analysis_failure() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/analyze/sync", base))
        .json(&json!({ "url": "ftp://example.com/" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "Failed to analyze page");
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let base = start_gateway().await;
    let client = reqwest::Client::new();

    let padding = "a".repeat(MAX_BODY_BYTES + 1);
    let response = client
        .post(format!("{}/analyze", base))
        .json(&json!({ "url": format!("https://example.com/?q={}", padding) }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);
}
