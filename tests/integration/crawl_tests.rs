//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitecrawl::config::{parse_args, CrawlerConfig, OutputFormat};
use sitecrawl::crawler::{crawl, Coordinator, HttpFetcher};
use sitecrawl::output::{CrawlReport, NoopObserver};
use sitecrawl::storage::SqlitePageStore;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML page linking to each of `links`
fn html_page(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">Link to {}</a>"#, href, href))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        title, title, anchors
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Normalized key prefix for pages on the mock server
fn host_key(server: &MockServer) -> String {
    let url = Url::parse(&server.uri()).expect("mock server uri");
    format!(
        "{}:{}",
        url.host_str().expect("mock server host"),
        url.port().expect("mock server port")
    )
}

fn counts(report: &CrawlReport) -> HashMap<String, usize> {
    report
        .visited
        .iter()
        .map(|page| (page.url.clone(), page.count))
        .collect()
}

async fn run_crawl(config: CrawlerConfig) -> CrawlReport {
    let fetcher = Arc::new(HttpFetcher::new(&config.http).expect("http client"));
    let coordinator = Coordinator::new(config, fetcher).expect("coordinator");
    coordinator.run().await
}

fn config_for(server: &MockServer, max_concurrency: usize, max_pages: usize) -> CrawlerConfig {
    CrawlerConfig::new(
        Url::parse(&server.uri()).expect("mock server uri"),
        max_concurrency,
        max_pages,
    )
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html_page("Home", &["/page1", "/page2"])).await;
    mount_page(&server, "/page1", html_page("Page 1", &["/"])).await;
    mount_page(
        &server,
        "/page2",
        html_page("Page 2", &["/page1", "/missing", "/data.json"]),
    )
    .await;
    mount_page(&server, "/missing", ResponseTemplate::new(404)).await;
    mount_page(
        &server,
        "/data.json",
        ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"),
    )
    .await;

    let report = run_crawl(config_for(&server, 3, 50)).await;
    let host = host_key(&server);

    let visited: Vec<&str> = report.visited.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        visited,
        vec![
            host.clone(),
            format!("{}/page1", host),
            format!("{}/page2", host)
        ]
    );

    let counts = counts(&report);
    assert_eq!(counts[&host], 2);
    assert_eq!(counts[&format!("{}/page1", host)], 2);
    assert_eq!(counts[&format!("{}/page2", host)], 1);

    // The 404 and the JSON document fail without affecting their siblings
    assert_eq!(report.stats.fetch_failures, 2);
}

#[tokio::test]
async fn test_redirect_target_is_deduplicated() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html_page("Home", &["/old", "/new"])).await;
    mount_page(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("Location", "/new"),
    )
    .await;
    mount_page(&server, "/new", html_page("New", &[])).await;

    let report = run_crawl(config_for(&server, 2, 50)).await;
    let host = host_key(&server);

    let counts = counts(&report);
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[&format!("{}/new", host)], 2);
    assert_eq!(report.stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_page_budget_stops_expansion() {
    let server = MockServer::start().await;

    let links: Vec<String> = (1..=12).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_page(&server, "/", html_page("Home", &link_refs)).await;
    for link in &link_refs {
        mount_page(&server, link, html_page(link, &["/"])).await;
    }

    let report = run_crawl(config_for(&server, 4, 5)).await;

    assert_eq!(report.visited.len(), 5);
    assert!(report.links.len() <= 5);
}

#[tokio::test]
async fn test_filter_selectors_and_json_report() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html_page("Home", &["/docs/intro", "/about"])).await;
    mount_page(&server, "/docs/intro", html_page("Intro", &[])).await;
    mount_page(&server, "/about", html_page("About", &["/docs/faq"])).await;
    mount_page(&server, "/docs/faq", html_page("FAQ", &[])).await;

    let uri = server.uri();
    let config = parse_args(
        &[
            uri.as_str(),
            "2",
            "20",
            "selectors=h1",
            "output_format=json",
            "filter=docs",
        ],
        None,
    )
    .expect("valid arguments");
    assert_eq!(config.output_format, OutputFormat::Json);

    let report = crawl(config, Arc::new(NoopObserver))
        .await
        .expect("crawl runs");

    // Traversal ignores the filter, reporting does not
    assert_eq!(report.visited.len(), 4);
    assert_eq!(report.links.len(), 2);
    assert!(report.links.iter().all(|link| link.url.contains("/docs/")));

    let mut headings: Vec<&str> = report
        .contents
        .iter()
        .map(|content| content.formatted.as_str())
        .collect();
    headings.sort();
    assert_eq!(
        headings,
        vec![r#"["About"]"#, r#"["FAQ"]"#, r#"["Home"]"#, r#"["Intro"]"#]
    );

    let rendered = report.render(OutputFormat::Json).expect("json report");
    let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
    assert_eq!(value["visited"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn test_page_store_serves_repeat_crawls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", &["/a"]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page("A", &[]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("pages.db");

    let mut config = config_for(&server, 1, 10);
    config.database_path = Some(db_path.to_string_lossy().into_owned());

    let first = crawl(config.clone(), Arc::new(NoopObserver))
        .await
        .expect("first crawl");
    let second = crawl(config, Arc::new(NoopObserver))
        .await
        .expect("second crawl");

    assert_eq!(first.visited.len(), 2);
    assert_eq!(second.visited.len(), 2);

    let store = SqlitePageStore::new(&db_path).expect("reopen store");
    assert_eq!(store.count().expect("count"), 2);
}
