use crate::common::{fast_fetcher_config, mount_page, mount_slow_page, GOOGLE_CONTAINER_PAGE};
use gtm_probe::config::FetcherConfig;
use gtm_probe::pipeline::{HttpFetcher, PageFetcher};
use gtm_probe::FetchError;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", 200, GOOGLE_CONTAINER_PAGE).await;

    let fetcher = HttpFetcher::from_config(&FetcherConfig::default()).unwrap();
    let body = fetcher
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("fetch should succeed");

    assert_eq!(body, GOOGLE_CONTAINER_PAGE);
}

#[tokio::test]
async fn test_fetch_returns_body_of_error_pages() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/missing", 404, "<html>not here</html>").await;
    mount_page(&mock_server, "/broken", 500, "<html>oops</html>").await;

    let fetcher = HttpFetcher::from_config(&FetcherConfig::default()).unwrap();

    let body = fetcher
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<html>not here</html>");

    let body = fetcher
        .fetch(&format!("{}/broken", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<html>oops</html>");
}

#[tokio::test]
async fn test_fetch_sends_configured_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "ProbeTest/2.0"))
        .and(header("accept", "text/html"))
        .and(header("accept-language", "de-DE"))
        .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
        .mount(&mock_server)
        .await;

    let config = FetcherConfig {
        user_agent: "ProbeTest/2.0".to_string(),
        accept_language: "de-DE".to_string(),
        ..FetcherConfig::default()
    };
    let fetcher = HttpFetcher::from_config(&config).unwrap();

    let body = fetcher
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "matched");
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", 200, "<html>moved</html>").await;

    let fetcher = HttpFetcher::from_config(&FetcherConfig::default()).unwrap();
    let body = fetcher
        .fetch(&format!("{}/old", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<html>moved</html>");
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;
    mount_slow_page(&mock_server, "/slow", Duration::from_secs(3)).await;

    let fetcher = HttpFetcher::from_config(&fast_fetcher_config()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }), "got {:?}", err);
    assert!(err.to_string().contains("timeout"));
}
