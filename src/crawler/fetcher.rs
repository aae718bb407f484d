//! HTTP fetcher implementation
//!
//! This module handles all page retrieval for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests with redirects followed up to a fixed hop limit
//! - Rejecting error statuses and non-HTML responses
//! - Serving pages from an optional page store

use crate::config::HttpSettings;
use crate::storage::PageStore;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirect hops followed for a single fetch
pub const MAX_REDIRECTS: usize = 10;

/// Errors produced while fetching a single page
///
/// These are local to one crawl task: they end that task's branch of the
/// traversal and are never propagated to other tasks.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not HTML (content type '{content_type}')")]
    ContentType { url: String, content_type: String },

    #[error("Failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the content was served from, after redirects
    pub final_url: Url,
    pub status_code: u16,
    pub content_type: String,
    pub body: String,
}

/// Retrieves HTML pages for the orchestrator
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, failing on status >= 400 or a non-HTML content type
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `settings` - User agent and timeout settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitecrawl::config::HttpSettings;
/// use sitecrawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpSettings::default()).unwrap();
/// ```
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value denotes an HTML document
pub fn is_html(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("text/html")
}

/// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let client = build_http_client(settings).map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::ContentType {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Serves pages from a [`PageStore`], falling back to another fetcher
///
/// Fetched pages are written back to the store together with the URL they
/// were served from, so a cached redirect keeps its target. Store failures
/// are logged and never fail the fetch.
pub struct CachingFetcher {
    inner: Arc<dyn PageFetcher>,
    store: Arc<dyn PageStore>,
}

impl CachingFetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, store: Arc<dyn PageStore>) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl PageFetcher for CachingFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        match self.store.lookup_page(url.as_str()) {
            Ok(Some(stored)) => match Url::parse(&stored.final_url) {
                Ok(final_url) => {
                    tracing::debug!("Serving {} from page store", url);
                    return Ok(FetchedPage {
                        final_url,
                        status_code: 200,
                        content_type: "text/html".to_string(),
                        body: stored.content,
                    });
                }
                Err(e) => tracing::warn!(
                    "Ignoring stored page for {} with bad final URL '{}': {}",
                    url,
                    stored.final_url,
                    e
                ),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Page store lookup failed for {}: {}", url, e),
        }

        let page = self.inner.fetch(url).await?;

        if let Err(e) = self
            .store
            .persist_page(url.as_str(), page.final_url.as_str(), &page.body)
        {
            tracing::warn!("Failed to persist {}: {}", url, e);
        }

        Ok(page)
    }
}
