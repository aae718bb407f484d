//! Crawl statistics
//!
//! Counters are updated lock-free by crawl tasks and read once, as a
//! snapshot, when the crawl has drained.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Live counters for one crawl
#[derive(Debug)]
pub struct CrawlStats {
    started: Instant,
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    pages_admitted: AtomicU64,
    revisits: AtomicU64,
    budget_rejections: AtomicU64,
    off_origin_skipped: AtomicU64,
    links_collected: AtomicU64,
    content_collected: AtomicU64,
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Pages returned successfully by the fetcher
    pub pages_fetched: u64,

    /// Tasks that ended in `Failed`
    pub fetch_failures: u64,

    /// Distinct pages admitted to the registry
    pub pages_admitted: u64,

    /// Fetched pages that were already in the registry
    pub revisits: u64,

    /// Links or pages turned away because the budget was spent
    pub budget_rejections: u64,

    /// Links and redirects rejected by the same-origin policy
    pub off_origin_skipped: u64,

    pub links_collected: u64,
    pub content_collected: u64,

    /// Wall-clock duration of the crawl
    pub elapsed_ms: u64,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            pages_fetched: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            pages_admitted: AtomicU64::new(0),
            revisits: AtomicU64::new(0),
            budget_rejections: AtomicU64::new(0),
            off_origin_skipped: AtomicU64::new(0),
            links_collected: AtomicU64::new(0),
            content_collected: AtomicU64::new(0),
        }
    }

    pub fn record_fetch(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_admitted(&self) {
        self.pages_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_revisit(&self) {
        self.revisits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_budget_rejection(&self) {
        self.budget_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_off_origin(&self) {
        self.off_origin_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link(&self) {
        self.links_collected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_content(&self) {
        self.content_collected.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            pages_admitted: self.pages_admitted.load(Ordering::Relaxed),
            revisits: self.revisits.load(Ordering::Relaxed),
            budget_rejections: self.budget_rejections.load(Ordering::Relaxed),
            off_origin_skipped: self.off_origin_skipped.load(Ordering::Relaxed),
            links_collected: self.links_collected.load(Ordering::Relaxed),
            content_collected: self.content_collected.load(Ordering::Relaxed),
            elapsed_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stdout is reserved for the report, which may be JSON or CSV.
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StatsSnapshot) {
    eprintln!("=== Crawl Statistics ===");
    eprintln!("  Pages fetched: {}", stats.pages_fetched);
    eprintln!("  Distinct pages: {}", stats.pages_admitted);
    eprintln!("  Re-encounters: {}", stats.revisits);
    eprintln!("  Failures: {}", stats.fetch_failures);
    eprintln!("  Budget rejections: {}", stats.budget_rejections);
    eprintln!("  Off-origin skipped: {}", stats.off_origin_skipped);
    eprintln!("  Links collected: {}", stats.links_collected);
    eprintln!("  Content collected: {}", stats.content_collected);

    let seconds = stats.elapsed_ms as f64 / 1000.0;
    let rate = if seconds > 0.0 {
        stats.pages_fetched as f64 / seconds
    } else {
        0.0
    };
    eprintln!("  Elapsed: {:.2}s ({:.2} pages/sec)", seconds, rate);
}
