//! Output traits and error types
//!
//! This module defines the observer interface the coordinator reports to
//! while a crawl is running, and the errors raised while rendering output.

use crate::state::{ContentRecord, LinkRecord};
use crate::CrawlerError;
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives crawl events as they happen
///
/// Callbacks run on crawl tasks, possibly concurrently, and must not block
/// for long. All methods default to doing nothing.
pub trait CrawlObserver: Send + Sync {
    /// A link record was added to the collection
    fn on_link(&self, _link: &LinkRecord) {}

    /// Content was extracted from a page
    fn on_content(&self, _content: &ContentRecord) {}

    /// A task failed; its branch of the traversal has ended
    fn on_failure(&self, _url: &Url, _error: &CrawlerError) {}
}

/// An observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {}
