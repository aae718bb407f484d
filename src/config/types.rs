use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Resolved, immutable crawl configuration
///
/// Built once at startup and shared by reference with every crawl task.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Seed URL; also defines the origin for the same-origin policy
    pub base_url: Url,

    /// Maximum number of simultaneously outstanding fetches
    pub max_concurrency: usize,

    /// Maximum number of distinct pages (and collected links)
    pub max_pages: usize,

    /// Content selectors applied to every fetched page
    pub selectors: Vec<String>,

    /// Dialect the selectors are written in
    pub selector_type: SelectorType,

    /// Format for extracted content, streamed links and the final report
    pub output_format: OutputFormat,

    /// Substring a link URL must contain to be reported
    pub filter: Option<String>,

    /// Only follow links whose host matches the base URL's host
    pub same_origin: bool,

    /// HTTP client settings
    pub http: HttpSettings,

    /// Path of the SQLite page store, if persistence is enabled
    pub database_path: Option<String>,
}

impl CrawlerConfig {
    /// Creates a configuration with default optional settings
    pub fn new(base_url: Url, max_concurrency: usize, max_pages: usize) -> Self {
        Self {
            base_url,
            max_concurrency,
            max_pages,
            selectors: Vec::new(),
            selector_type: SelectorType::default(),
            output_format: OutputFormat::default(),
            filter: None,
            same_origin: true,
            http: HttpSettings::default(),
            database_path: None,
        }
    }

    /// Returns the link filter, treating an empty filter as absent
    pub fn link_filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("sitecrawl/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Selector dialect for content extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    #[default]
    Css,
    Xpath,
    Regex,
}

impl SelectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Xpath => "xpath",
            Self::Regex => "regex",
        }
    }
}

impl FromStr for SelectorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "xpath" => Ok(Self::Xpath),
            "regex" => Ok(Self::Regex),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for extracted content and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional defaults loaded from a TOML file
///
/// Every field is optional; values given as `key=value` on the command line
/// take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub selectors: Option<Vec<String>>,

    #[serde(rename = "selector-type", default)]
    pub selector_type: Option<SelectorType>,

    #[serde(rename = "output-format", default)]
    pub output_format: Option<OutputFormat>,

    #[serde(default)]
    pub filter: Option<String>,

    #[serde(rename = "same-origin", default)]
    pub same_origin: Option<bool>,

    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}
