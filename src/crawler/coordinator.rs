//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator seeds one task with the base URL and lets every task
//! schedule its children. Each task is a tokio task that walks
//! `Pending -> Fetching -> Extracting -> Expanding -> Done`:
//!
//! - same-origin and budget checks happen before a task is spawned, so a
//!   rejected link costs neither a concurrency slot nor a budget entry
//! - a URL whose key is already registered is counted as a re-encounter
//!   without being fetched again
//! - the fetch runs while holding a governor permit, released on every path
//! - the fetched page's normalized final URL goes through the registry's
//!   atomic admit; only new pages are expanded
//! - children are registered with the work tracker before their parent
//!   finishes, so the crawl is complete exactly when the tracker drains
//!
//! Failures are local to one task: they are logged, reported to the
//! observer and end that branch of the traversal only.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::crawler::parser::ParsedDocument;
use crate::crawler::scheduler::{ConcurrencyGovernor, WorkTracker};
use crate::extract::ContentExtractor;
use crate::output::{CrawlObserver, CrawlReport, CrawlStats, NoopObserver, VisitedPage};
use crate::state::{
    Admission, ContentRecord, CrawlTask, LinkCollector, LinkRecord, TaskState, VisitedRegistry,
};
use crate::url::{is_same_origin, normalize_parsed};
use crate::CrawlerError;
use std::sync::Arc;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<CrawlerConfig>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Option<ContentExtractor>,
    observer: Arc<dyn CrawlObserver>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Retrieves pages for every task
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlerError)` - A content selector failed to compile
    pub fn new(config: CrawlerConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self, CrawlerError> {
        let extractor = if config.selectors.is_empty() {
            None
        } else {
            Some(ContentExtractor::new(
                &config.selectors,
                config.selector_type,
                config.output_format,
            )?)
        };

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            extractor,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Receives link records, content and failures as they happen
    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Runs the crawl to completion
    ///
    /// Resolves once every scheduled task has finished, then returns the
    /// visited pages, collected records and statistics.
    pub async fn run(self) -> CrawlReport {
        let crawl = Arc::new(Crawl {
            registry: VisitedRegistry::new(self.config.max_pages),
            collector: LinkCollector::new(self.config.max_pages),
            governor: ConcurrencyGovernor::new(self.config.max_concurrency),
            tracker: WorkTracker::new(),
            stats: CrawlStats::new(),
            config: self.config,
            fetcher: self.fetcher,
            extractor: self.extractor,
            observer: self.observer,
        });

        tracing::info!(
            "Starting crawl of {} (concurrency {}, page budget {})",
            crawl.config.base_url,
            crawl.config.max_concurrency,
            crawl.config.max_pages
        );

        crawl.schedule(crawl.config.base_url.clone());
        crawl.tracker.wait_idle().await;

        let report = crawl.report();
        tracing::info!(
            "Crawl completed: {} pages visited in {} ms",
            report.visited.len(),
            report.stats.elapsed_ms
        );
        report
    }
}

/// State shared by every task of one crawl
struct Crawl {
    config: Arc<CrawlerConfig>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Option<ContentExtractor>,
    observer: Arc<dyn CrawlObserver>,
    registry: VisitedRegistry,
    collector: LinkCollector,
    governor: ConcurrencyGovernor,
    tracker: Arc<WorkTracker>,
    stats: CrawlStats,
}

/// Everything a task needs from one fetched page
struct PageAnalysis {
    links: Vec<Url>,
    records: Vec<LinkRecord>,
    contents: Vec<ContentRecord>,
}

impl Crawl {
    /// Spawns a task for `url` unless it is rejected up front
    fn schedule(self: &Arc<Self>, url: Url) {
        if self.config.same_origin && !is_same_origin(&self.config.base_url, &url) {
            tracing::debug!("Skipping off-origin link {}", url);
            self.stats.record_off_origin();
            return;
        }

        if self.registry.is_exhausted() {
            self.stats.record_budget_rejection();
            return;
        }

        let guard = self.tracker.begin();
        let crawl = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            let task = CrawlTask::new(url, crawl.config.filter.clone());
            crawl.process(task).await;
        });
    }

    async fn process(self: Arc<Self>, mut task: CrawlTask) {
        if let Err(error) = self.execute(&mut task).await {
            task.fail();
            self.stats.record_failure();
            tracing::warn!("Failed to crawl {}: {}", task.url, error);
            self.observer.on_failure(&task.url, &error);
        }
        tracing::debug!("{} finished as {}", task.url, task.state());
    }

    async fn execute(self: &Arc<Self>, task: &mut CrawlTask) -> Result<(), CrawlerError> {
        task.advance(TaskState::Fetching)?;

        let requested = normalize_parsed(&task.url)?;
        if let Some(outcome) = self.registry.readmit(&requested) {
            self.record_settled(&requested, outcome);
            return task.advance(TaskState::Done);
        }

        let page = {
            let _permit = self.governor.acquire().await?;
            self.fetcher.fetch(&task.url).await?
        };
        self.stats.record_fetch();

        if self.config.same_origin && !is_same_origin(&self.config.base_url, &page.final_url) {
            tracing::debug!("{} redirected off-origin to {}", task.url, page.final_url);
            self.stats.record_off_origin();
            return task.advance(TaskState::Done);
        }

        let key = normalize_parsed(&page.final_url)?;
        match self.registry.admit(&key) {
            Admission::New => {
                self.stats.record_admitted();
                tracing::info!("Crawling {}", key);
            }
            outcome => {
                self.record_settled(&key, outcome);
                return task.advance(TaskState::Done);
            }
        }

        task.advance(TaskState::Extracting)?;
        let analysis = self.analyze(&page, task.filter.as_deref());

        for record in analysis.records {
            if !self.collector.add_link(record.clone()) {
                break;
            }
            self.stats.record_link();
            self.observer.on_link(&record);
        }

        for content in analysis.contents {
            if !self.collector.add_content(content.clone()) {
                break;
            }
            self.stats.record_content();
            self.observer.on_content(&content);
        }

        task.advance(TaskState::Expanding)?;
        for link in analysis.links {
            self.schedule(link);
        }

        task.advance(TaskState::Done)
    }

    /// Records an admission that ends the task without expansion
    fn record_settled(&self, key: &str, outcome: Admission) {
        match outcome {
            Admission::Revisited(count) => {
                self.stats.record_revisit();
                tracing::trace!("{} seen {} times", key, count);
            }
            Admission::BudgetExhausted => {
                self.stats.record_budget_rejection();
                tracing::debug!("Page budget exhausted, not expanding {}", key);
            }
            Admission::New => {}
        }
    }

    /// Parses the page once for link discovery and content extraction
    ///
    /// The parsed document is not `Send`, so it must never live across an
    /// await point.
    fn analyze(&self, page: &FetchedPage, filter: Option<&str>) -> PageAnalysis {
        let document = ParsedDocument::parse(&page.body);
        let links = document.links(&page.final_url);
        let records = document.link_records(&page.final_url, filter);

        let contents = match &self.extractor {
            Some(extractor) => match extractor.extract_from(document.html(), &page.body) {
                Ok(found) => found
                    .into_iter()
                    .map(|extracted| ContentRecord {
                        url: page.final_url.to_string(),
                        selector: extracted.selector,
                        matches: extracted.matches,
                        formatted: extracted.formatted,
                    })
                    .collect(),
                Err(e) => {
                    tracing::warn!("Content extraction failed for {}: {}", page.final_url, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        PageAnalysis {
            links,
            records,
            contents,
        }
    }

    fn report(&self) -> CrawlReport {
        CrawlReport {
            base_url: self.config.base_url.to_string(),
            visited: self
                .registry
                .snapshot()
                .into_iter()
                .map(|(url, count)| VisitedPage { url, count })
                .collect(),
            links: self.collector.links(),
            contents: self.collector.contents(),
            stats: self.stats.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorType;
    use crate::crawler::fetcher::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const HOST: &str = "site.test";

    /// Serves a fixed set of pages on `site.test`; everything else is a 404
    struct SiteFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
        active: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
        final_host: Option<&'static str>,
    }

    impl SiteFetcher {
        fn new(site: &[(&str, &[&str])]) -> Self {
            let pages = site
                .iter()
                .map(|(path, links)| {
                    let anchors: String = links
                        .iter()
                        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
                        .collect();
                    let body = format!(
                        "<html><body><h1>Page {}</h1>{}</body></html>",
                        path, anchors
                    );
                    (path.to_string(), body)
                })
                .collect();

            Self {
                pages,
                requested: Mutex::new(Vec::new()),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                delay: Duration::from_millis(2),
                final_host: None,
            }
        }

        /// Serves every page as if redirected to `host`
        fn redirecting_to(mut self, host: &'static str) -> Self {
            self.final_host = Some(host);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for SiteFetcher {
        async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            let served = url
                .host_str()
                .map_or(false, |host| host.trim_start_matches("www.") == HOST);
            let body = if served {
                self.pages.get(url.path())
            } else {
                None
            };

            let mut final_url = url.clone();
            if let Some(host) = self.final_host {
                final_url.set_host(Some(host)).unwrap();
            }

            match body {
                Some(body) => Ok(FetchedPage {
                    final_url,
                    status_code: 200,
                    content_type: "text/html".to_string(),
                    body: body.clone(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn config(max_concurrency: usize, max_pages: usize) -> CrawlerConfig {
        CrawlerConfig::new(
            Url::parse(&format!("http://{}/", HOST)).unwrap(),
            max_concurrency,
            max_pages,
        )
    }

    async fn crawl(config: CrawlerConfig, fetcher: Arc<SiteFetcher>) -> CrawlReport {
        let coordinator = Coordinator::new(config, fetcher).unwrap();
        tokio::time::timeout(Duration::from_secs(10), coordinator.run())
            .await
            .expect("crawl should terminate")
    }

    fn visited_urls(report: &CrawlReport) -> Vec<&str> {
        report.visited.iter().map(|page| page.url.as_str()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_small_site_visited_exactly_once() {
        let fetcher = Arc::new(SiteFetcher::new(&[
            ("/", &["/a", "/b"]),
            ("/a", &["/b", "/c"]),
            ("/b", &["/"]),
            ("/c", &["/a", "/d"]),
            ("/d", &[]),
        ]));

        let report = crawl(config(3, 100), fetcher).await;

        assert_eq!(
            visited_urls(&report),
            vec!["site.test", "site.test/a", "site.test/b", "site.test/c", "site.test/d"]
        );
        assert_eq!(report.stats.pages_admitted, 5);
        assert_eq!(report.stats.fetch_failures, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_page_budget_caps_visits() {
        let links: Vec<String> = (1..20).map(|i| format!("/p{}", i)).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let mut site: Vec<(&str, &[&str])> = vec![("/", link_refs.as_slice())];
        for link in &link_refs {
            site.push((*link, &[][..]));
        }
        let fetcher = Arc::new(SiteFetcher::new(&site));

        let report = crawl(config(4, 5), fetcher).await;

        assert_eq!(report.visited.len(), 5);
        assert!(report.links.len() <= 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_child_does_not_block_siblings() {
        let fetcher = Arc::new(SiteFetcher::new(&[
            ("/", &["/missing", "/b", "/c"]),
            ("/b", &[]),
            ("/c", &[]),
        ]));

        let report = crawl(config(2, 100), fetcher).await;

        assert_eq!(
            visited_urls(&report),
            vec!["site.test", "site.test/b", "site.test/c"]
        );
        assert_eq!(report.stats.fetch_failures, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_filter_limits_reporting_not_traversal() {
        let fetcher = Arc::new(SiteFetcher::new(&[
            ("/", &["/blog/one", "/about"]),
            ("/blog/one", &[]),
            ("/about", &["/team"]),
            ("/team", &[]),
        ]));
        let mut config = config(2, 100);
        config.filter = Some("blog".to_string());

        let report = crawl(config, fetcher).await;

        assert_eq!(report.visited.len(), 4);
        assert!(visited_urls(&report).contains(&"site.test/team"));
        assert!(!report.links.is_empty());
        assert!(report.links.iter().all(|link| link.url.contains("blog")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_off_origin_links_not_fetched() {
        let fetcher = Arc::new(SiteFetcher::new(&[
            (
                "/",
                &[
                    "http://other.test/x",
                    "http://blog.site.test/y",
                    "http://www.site.test/z",
                ],
            ),
            ("/z", &[]),
        ]));

        let report = crawl(config(2, 100), fetcher.clone()).await;

        let requested = fetcher.requested();
        assert!(!requested.iter().any(|url| url.contains("other.test")));
        assert!(!requested.iter().any(|url| url.contains("blog.site.test")));
        assert!(requested.contains(&"http://www.site.test/z".to_string()));
        assert_eq!(report.stats.off_origin_skipped, 2);
        assert_eq!(visited_urls(&report), vec!["site.test", "site.test/z"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_seed_redirecting_to_www_is_crawled() {
        let fetcher = Arc::new(
            SiteFetcher::new(&[("/", &["/a"]), ("/a", &["/"])]).redirecting_to("www.site.test"),
        );

        let report = crawl(config(2, 100), fetcher).await;

        assert_eq!(visited_urls(&report), vec!["site.test", "site.test/a"]);
        assert_eq!(report.stats.off_origin_skipped, 0);
        assert_eq!(report.stats.fetch_failures, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_known_page_not_fetched_again() {
        let fetcher = Arc::new(SiteFetcher::new(&[("/", &["/a"]), ("/a", &["/", "/#top"])]));

        let report = crawl(config(2, 100), fetcher.clone()).await;

        let root_fetches = fetcher
            .requested()
            .iter()
            .filter(|url| url.as_str() == "http://site.test/")
            .count();
        assert_eq!(root_fetches, 1);
        assert_eq!(fetcher.requested().len(), 2);
        assert_eq!(report.stats.revisits, 2);
        assert_eq!(
            report.visited.iter().find(|page| page.url == "site.test").map(|page| page.count),
            Some(3)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cross_origin_allowed_when_disabled() {
        let fetcher = Arc::new(SiteFetcher::new(&[("/", &["http://other.test/x"])]));
        let mut config = config(2, 100);
        config.same_origin = false;

        let report = crawl(config, fetcher.clone()).await;

        assert!(fetcher
            .requested()
            .contains(&"http://other.test/x".to_string()));
        assert_eq!(report.stats.fetch_failures, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_cap_respected() {
        let links: Vec<String> = (1..30).map(|i| format!("/p{}", i)).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let mut site: Vec<(&str, &[&str])> = vec![("/", link_refs.as_slice())];
        for link in &link_refs {
            site.push((*link, &[][..]));
        }
        let fetcher = Arc::new(SiteFetcher::new(&site));

        let report = crawl(config(2, 100), fetcher.clone()).await;

        assert_eq!(report.visited.len(), 30);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_re_encounters_counted() {
        let fetcher = Arc::new(SiteFetcher::new(&[
            ("/", &["/a", "/a#top"]),
            ("/a", &["/"]),
        ]));

        let report = crawl(config(2, 100), fetcher).await;

        let counts: HashMap<&str, usize> = report
            .visited
            .iter()
            .map(|page| (page.url.as_str(), page.count))
            .collect();
        assert_eq!(counts.get("site.test"), Some(&2));
        assert_eq!(counts.get("site.test/a"), Some(&2));
        assert_eq!(report.visited.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_content_extracted_per_page() {
        let fetcher = Arc::new(SiteFetcher::new(&[("/", &["/a"]), ("/a", &[])]));
        let mut config = config(2, 100);
        config.selectors = vec!["h1".to_string()];
        config.selector_type = SelectorType::Css;

        let report = crawl(config, fetcher).await;

        let mut headings: Vec<&str> = report
            .contents
            .iter()
            .map(|content| content.formatted.as_str())
            .collect();
        headings.sort();
        assert_eq!(headings, vec!["Page /", "Page /a"]);
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = config(1, 1);
        config.selectors = vec!["((".to_string()];
        config.selector_type = SelectorType::Regex;

        let fetcher = Arc::new(SiteFetcher::new(&[]));
        assert!(matches!(
            Coordinator::new(config, fetcher),
            Err(CrawlerError::Extract(_))
        ));
    }
}
