//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and the optional page-store cache
//! - HTML parsing and link discovery
//! - Concurrency limiting and completion tracking
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, is_html, CachingFetcher, FetchError, FetchedPage, HttpFetcher,
    PageFetcher, MAX_REDIRECTS,
};
pub use parser::{
    discover_link_records, discover_links, resolve_link, Anchor, Anchors, ParsedDocument,
};
pub use scheduler::{ConcurrencyGovernor, GovernorPermit, TaskGuard, WorkTracker};

use crate::config::CrawlerConfig;
use crate::output::{CrawlObserver, CrawlReport};
use crate::storage::SqlitePageStore;
use crate::CrawlerError;
use std::path::Path;
use std::sync::Arc;

/// Builds the page fetcher for `config`
///
/// Uses the HTTP client directly, or wraps it with the SQLite page store
/// when a database path is configured.
pub fn build_fetcher(config: &CrawlerConfig) -> Result<Arc<dyn PageFetcher>, CrawlerError> {
    let http: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.http)?);

    match &config.database_path {
        Some(path) => {
            let store = SqlitePageStore::new(Path::new(path))?;
            tracing::info!("Caching pages in {}", path);
            Ok(Arc::new(CachingFetcher::new(http, Arc::new(store))))
        }
        None => Ok(http),
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client, with the page store if one is configured
/// 2. Seed the crawl with the base URL
/// 3. Fetch pages, admit them and follow their links
/// 4. Wait for every task to finish and return the report
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `observer` - Receives link records, content and failures as they occur
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(CrawlerError)` - The crawl could not be started
pub async fn crawl(
    config: CrawlerConfig,
    observer: Arc<dyn CrawlObserver>,
) -> Result<CrawlReport, CrawlerError> {
    let fetcher = build_fetcher(&config)?;
    let coordinator = Coordinator::new(config, fetcher)?.with_observer(observer);
    Ok(coordinator.run().await)
}
