//! Storage traits and error types
//!
//! This module defines the trait interface for page stores and associated
//! error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A cached page body and the URL it was served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    /// URL the body was served from, after redirects
    pub final_url: String,
    pub content: String,
}

/// A cache of fetched page bodies keyed by the requested URL
///
/// Implementations must be safe to share between crawl tasks.
pub trait PageStore: Send + Sync {
    /// Stores a page fetched for `url` that was served from `final_url`,
    /// replacing any previous entry for `url`
    fn persist_page(&self, url: &str, final_url: &str, content: &str) -> StorageResult<()>;

    /// Returns the stored page for `url`, if any
    fn lookup_page(&self, url: &str) -> StorageResult<Option<StoredPage>>;

    /// Stores `content` for a page served without redirects
    fn persist(&self, url: &str, content: &str) -> StorageResult<()> {
        self.persist_page(url, url, content)
    }

    /// Returns the stored content for `url`, if any
    fn lookup(&self, url: &str) -> StorageResult<Option<String>> {
        Ok(self.lookup_page(url)?.map(|page| page.content))
    }
}
