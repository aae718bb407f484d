//! Output module for streaming crawl events and reporting results
//!
//! This module handles:
//! - The startup banner echoing the resolved configuration
//! - Streaming link records and extracted content while the crawl runs
//! - Rendering the final report as text, JSON or CSV
//! - Recording crawl statistics

mod console;
mod report;
pub mod stats;
mod traits;

pub use console::{banner, print_banner, ConsoleObserver};
pub use report::{CrawlReport, VisitedPage};
pub use stats::{print_statistics, CrawlStats, StatsSnapshot};
pub use traits::{CrawlObserver, NoopObserver, OutputError, OutputResult};
