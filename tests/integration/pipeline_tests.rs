//! End-to-end pipeline runs

use crate::common::StubFetcher;
use ripple_crawl::config::Config;
use ripple_crawl::crawler::{crawl, FailureStage, HtmlLinkExtractor, Pipeline, PipelineOptions};
use ripple_crawl::storage::{MemoryStore, PageStore};
use ripple_crawl::RippleError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ONE_LINK: &str = r#"<html><body><a href="https://linked.example.com/">x</a></body></html>"#;

fn stub_pipeline(fetcher: Arc<StubFetcher>, store: Arc<MemoryStore>, workers: usize) -> Pipeline {
    Pipeline::new(fetcher, Arc::new(HtmlLinkExtractor::new()), store).with_options(
        PipelineOptions {
            workers,
            ..Default::default()
        },
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_duplicate_seeds_fetch_once() {
    let fetcher = Arc::new(StubFetcher::new(ONE_LINK));
    let store = Arc::new(MemoryStore::new());
    let pipeline = stub_pipeline(fetcher.clone(), store.clone(), 2);

    let report = pipeline
        .run(["https://a.com", "https://a.com", "https://b.com"])
        .await;

    assert_eq!(store.count(), 2);
    assert_eq!(report.seeds, 3);
    assert_eq!(report.admitted, 2);
    assert_eq!(report.saved, 2);
    assert_eq!(report.failed, 0);

    let calls = fetcher.calls();
    assert_eq!(calls.iter().filter(|u| *u == "https://a.com").count(), 1);

    for page in store.snapshot() {
        assert_eq!(page.link_count, 1);
        assert_eq!(page.byte_count, ONE_LINK.len());
    }
}

#[tokio::test]
async fn test_failed_fetch_is_skipped() {
    let fetcher = Arc::new(StubFetcher::new(ONE_LINK).failing_for("https://b.com"));
    let store = Arc::new(MemoryStore::new());
    let pipeline = stub_pipeline(fetcher, store.clone(), 2);

    let report = pipeline
        .run(["https://a.com", "https://b.com", "https://c.com"])
        .await;

    assert_eq!(store.count(), 2);
    assert_eq!(report.saved, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.cancelled);
    assert!(store.snapshot().iter().all(|p| p.url != "https://b.com"));
}

#[tokio::test]
async fn test_count_matches_successful_fetches() {
    for workers in [1, 2, 3, 8] {
        for seeds in [0usize, 1, 5, 40] {
            let urls: Vec<String> = (0..seeds).map(|i| format!("https://{}.test/", i)).collect();

            // Every third URL fails
            let mut fetcher = StubFetcher::new("<p></p>");
            for url in urls.iter().step_by(3) {
                fetcher = fetcher.failing_for(url);
            }
            let expected = seeds - urls.iter().step_by(3).count();

            let store = Arc::new(MemoryStore::new());
            let pipeline = stub_pipeline(Arc::new(fetcher), store.clone(), workers);
            let report = pipeline.run(urls).await;

            assert_eq!(
                store.count(),
                expected,
                "workers={} seeds={}",
                workers,
                seeds
            );
            assert_eq!(report.processed, seeds);
        }
    }
}

#[tokio::test]
async fn test_non_positive_worker_count_still_runs() {
    let mut config = Config::default();
    config.pipeline.workers = -5;

    let options = PipelineOptions::from_config(&config.pipeline);
    assert_eq!(options.effective_workers(), 2);

    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(
        Arc::new(StubFetcher::new("")),
        Arc::new(HtmlLinkExtractor::new()),
        store.clone(),
    )
    .with_options(options);

    pipeline.run(["https://a.com", "https://b.com"]).await;
    assert_eq!(store.count(), 2);
}

#[tokio::test]
async fn test_collected_failures_name_the_stage() {
    let fetcher = Arc::new(
        StubFetcher::new("")
            .failing_for("https://x.com")
            .failing_for("https://y.com"),
    );
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(fetcher, Arc::new(HtmlLinkExtractor::new()), store)
        .with_options(PipelineOptions {
            collect_failures: true,
            ..Default::default()
        });

    let report = pipeline
        .run(["https://x.com", "https://y.com", "https://z.com"])
        .await;

    assert_eq!(report.failed, 2);
    assert_eq!(report.failures_by_stage(FailureStage::Fetch), 2);

    let mut urls: Vec<_> = report.failures.iter().map(|f| f.url.as_str()).collect();
    urls.sort();
    assert_eq!(urls, vec!["https://x.com", "https://y.com"]);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = stub_pipeline(Arc::new(StubFetcher::new("")), store.clone(), 2);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run_with_cancellation(["https://a.com", "https://b.com"], cancel),
    )
    .await
    .expect("cancelled run did not return");

    assert!(report.cancelled);
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_http_single_pass() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        200,
        format!(
            r#"<a href="{base}/one">1</a><a href="{base}/two">2</a><a href="/relative">r</a>"#,
            base = base
        ),
    )
    .await;
    mount_page(&server, "/one", 200, "<p>one</p>".to_string()).await;
    mount_page(&server, "/missing", 404, "gone".to_string()).await;

    let mut config = Config::default();
    config.seeds = vec![
        format!("{}/", base),
        format!("{}/one", base),
        format!("{}/missing", base),
    ];
    config.pipeline.collect_failures = true;

    let (report, store) = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(store.count(), 2);
    assert_eq!(report.failed, 1);
    assert!(report.failures[0].error.contains("404"));

    // Links are counted, not followed
    let index = store
        .snapshot()
        .into_iter()
        .find(|p| p.url == format!("{}/", base))
        .unwrap();
    assert_eq!(index.link_count, 2);
    assert_eq!(report.admitted, 3);
}

#[tokio::test]
async fn test_http_follow_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        200,
        format!(
            r#"<a href="{base}/page1">1</a><a href="{base}/page2">2</a>"#,
            base = base
        ),
    )
    .await;
    mount_page(
        &server,
        "/page1",
        200,
        format!(r#"<a href="{base}/">home</a><a href="{base}/page3">3</a>"#, base = base),
    )
    .await;
    mount_page(&server, "/page2", 200, format!(r#"<a href="{}/">home</a>"#, base)).await;
    mount_page(&server, "/page3", 200, "<p>leaf</p>".to_string()).await;

    let mut config = Config::default();
    config.seeds = vec![format!("{}/", base)];
    config.pipeline.follow_links = true;
    config.pipeline.max_pages = 50;
    config.pipeline.queue_capacity = 1;

    let (report, store) = tokio::time::timeout(
        Duration::from_secs(10),
        crawl(&config, CancellationToken::new()),
    )
    .await
    .expect("link-following crawl did not terminate")
    .unwrap();

    assert_eq!(report.admitted, 4);
    assert_eq!(store.count(), 4);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_crawl_rejects_invalid_config() {
    let mut config = Config::default();
    config.seeds = vec!["ftp://files.example.com/".to_string()];

    let result = crawl(&config, CancellationToken::new()).await;
    assert!(matches!(result, Err(RippleError::Config(_))));
}
