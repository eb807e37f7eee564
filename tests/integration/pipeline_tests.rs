use crate::common::{
    fast_fetcher_config, mount_page, mount_slow_page, wait_for_terminal, GOOGLE_CONTAINER_PAGE,
    NO_TAG_PAGE,
};
use chrono::Utc;
use gtm_probe::pipeline::{HttpFetcher, Scheduler};
use gtm_probe::state::JobStatus;
use gtm_probe::storage::{JobStore, MemoryJobStore};
use gtm_probe::{Analyzer, JobId};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

fn build_pipeline() -> (Scheduler, Arc<MemoryJobStore>) {
    let store = Arc::new(MemoryJobStore::new());
    let fetcher = HttpFetcher::from_config(&fast_fetcher_config()).unwrap();
    let scheduler = Scheduler::new(store.clone(), Arc::new(fetcher), Arc::new(Analyzer::new()));
    (scheduler, store)
}

fn submit(scheduler: &Scheduler, store: &MemoryJobStore, url: String) -> JobId {
    let id = JobId::new();
    store.create(&id, Utc::now()).unwrap();
    scheduler.submit(id.clone(), url);
    id
}

#[tokio::test]
async fn test_job_detects_google_hosted_container() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", 200, GOOGLE_CONTAINER_PAGE).await;

    let (scheduler, store) = build_pipeline();
    let url = format!("{}/", mock_server.uri());
    let id = submit(&scheduler, &store, url.clone());

    let state = wait_for_terminal(store.as_ref(), &id).await;
    let result = state.result().expect("job should be done");

    assert_eq!(result.url, url);
    assert!(result.is_gtm_found);
    assert_eq!(result.gtm_domain, "www.googletagmanager.com");
    assert!(!result.is_proxified);
}

#[tokio::test]
async fn test_job_detects_first_party_container() {
    let mock_server = MockServer::start().await;
    // The mock server runs on 127.0.0.1, which is its own main domain
    let page = r#"<script src="//127.0.0.1/metrics/gtm.js?id=GTM-FP1"></script>"#;
    mount_page(&mock_server, "/", 200, page).await;

    let (scheduler, store) = build_pipeline();
    let id = submit(&scheduler, &store, format!("{}/", mock_server.uri()));

    let state = wait_for_terminal(store.as_ref(), &id).await;
    let result = state.result().unwrap();

    assert!(result.is_gtm_found);
    assert!(result.is_proxified);
    assert_eq!(result.gtm_domain, "127.0.0.1");
}

#[tokio::test]
async fn test_error_page_is_still_analyzed() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/gone", 404, GOOGLE_CONTAINER_PAGE).await;

    let (scheduler, store) = build_pipeline();
    let id = submit(&scheduler, &store, format!("{}/gone", mock_server.uri()));

    let state = wait_for_terminal(store.as_ref(), &id).await;
    assert_eq!(state.status(), JobStatus::Done);
    assert!(state.result().unwrap().is_gtm_found);
}

#[tokio::test]
async fn test_timeout_marks_error_and_next_job_runs() {
    let mock_server = MockServer::start().await;
    mount_slow_page(&mock_server, "/slow", Duration::from_secs(3)).await;
    mount_page(&mock_server, "/fast", 200, NO_TAG_PAGE).await;

    let (scheduler, store) = build_pipeline();
    let slow = submit(&scheduler, &store, format!("{}/slow", mock_server.uri()));
    let fast = submit(&scheduler, &store, format!("{}/fast", mock_server.uri()));

    // Queued behind the slow job
    assert_eq!(store.get(&fast).unwrap().status(), JobStatus::Pending);

    let failed = wait_for_terminal(store.as_ref(), &slow).await;
    assert_eq!(failed.status(), JobStatus::Error);
    assert!(!failed.error_message().unwrap().is_empty());

    let done = wait_for_terminal(store.as_ref(), &fast).await;
    assert_eq!(done.status(), JobStatus::Done);
    assert!(!done.result().unwrap().is_gtm_found);

    let slow_record = store.get(&slow).unwrap();
    let fast_record = store.get(&fast).unwrap();
    assert!(slow_record.finished_at.unwrap() <= fast_record.finished_at.unwrap());
}

#[tokio::test]
async fn test_unreachable_host_marks_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let (scheduler, store) = build_pipeline();
    let id = submit(&scheduler, &store, format!("http://127.0.0.1:{}/", port));

    let state = wait_for_terminal(store.as_ref(), &id).await;
    assert_eq!(state.status(), JobStatus::Error);
    assert!(state.error_message().unwrap().contains("Connection failed"));
}

#[tokio::test]
async fn test_unsupported_scheme_marks_error() {
    let (scheduler, store) = build_pipeline();
    let id = submit(&scheduler, &store, "ftp://example.com/page".to_string());

    let state = wait_for_terminal(store.as_ref(), &id).await;
    assert_eq!(state.status(), JobStatus::Error);
    assert!(state.error_message().unwrap().contains("ftp"));
}
