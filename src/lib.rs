//! Sitecrawl: a bounded, concurrent same-site crawler
//!
//! This crate turns a single seed URL into a deduplicated, concurrently
//! executing traversal of a site's link graph. A page budget caps the number
//! of distinct pages, a semaphore caps the number of simultaneous fetches, and
//! every page can optionally be mined for content with CSS, XPath or regex
//! selectors.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

pub use crawler::FetchError;
pub use extract::ExtractError;
pub use output::OutputError;
pub use storage::StorageError;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Invalid task transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("Concurrency governor was closed")]
    GovernorClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Error parsing base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid {name} '{value}'. Must be a positive integer")]
    NotPositive { name: &'static str, value: String },

    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    #[error("Invalid value '{value}' for option '{key}'")]
    InvalidOption { key: String, value: String },

    #[error("Invalid {dialect} selector '{pattern}': {reason}")]
    InvalidSelector {
        dialect: String,
        pattern: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlerConfig, OutputFormat, SelectorType};
pub use crawler::Coordinator;
pub use output::CrawlReport;
pub use state::{Admission, LinkRecord, TaskState, VisitedRegistry};
pub use crate::url::normalize_url;
