//! HttpFetcher against a wiremock server

use ripple_crawl::config::UserAgentConfig;
use ripple_crawl::crawler::{FetchError, Fetcher, HttpFetcher};
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    }
}

fn soon() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

#[tokio::test]
async fn test_fetch_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>hello</p>")
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&test_user_agent()).unwrap();
    let url = format!("{}/page", server.uri());
    let result = fetcher.fetch(&url, soon()).await.unwrap();

    assert_eq!(result.url, url);
    assert_eq!(result.status_code, 200);
    assert_eq!(result.body, b"<p>hello</p>");
    assert_eq!(result.content_type, "text/html; charset=utf-8");
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&test_user_agent()).unwrap();
    let result = fetcher
        .fetch(&format!("{}/missing", server.uri()), soon())
        .await;

    assert!(matches!(
        result,
        Err(FetchError::Status {
            status_code: 404,
            ..
        })
    ));
}

#[tokio::test]
async fn test_fetch_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&test_user_agent()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/", server.uri()), soon())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_fetch_honors_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&test_user_agent()).unwrap();
    let deadline = Instant::now() + Duration::from_millis(100);

    let started = Instant::now();
    let result = fetcher.fetch(&format!("{}/slow", server.uri()), deadline).await;

    assert!(matches!(result, Err(FetchError::DeadlineExceeded { .. })));
    assert!(started.elapsed() < Duration::from_secs(4));
}
