//! Console output: startup banner and streamed records

use crate::config::{CrawlerConfig, OutputFormat};
use crate::output::CrawlObserver;
use crate::state::{ContentRecord, LinkRecord};
use crate::CrawlerError;
use url::Url;

/// Prints the resolved configuration before the crawl starts
pub fn print_banner(config: &CrawlerConfig) {
    println!("{}", banner(config));
}

/// Formats the startup banner
pub fn banner(config: &CrawlerConfig) -> String {
    let selectors = if config.selectors.is_empty() {
        "(none)".to_string()
    } else {
        config.selectors.join(", ")
    };

    [
        format!("Starting crawl of: {}", config.base_url),
        format!("Max concurrency: {}", config.max_concurrency),
        format!("Max pages: {}", config.max_pages),
        format!("Selectors: {}", selectors),
        format!("Selector Type: {}", config.selector_type),
        format!("Output Format: {}", config.output_format),
        format!("Filter: {}", config.link_filter().unwrap_or("(none)")),
        format!("Same origin: {}", config.same_origin),
    ]
    .join("\n")
}

/// Streams link records and extracted content to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleObserver {
    format: OutputFormat,
}

impl ConsoleObserver {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats one link record as a single line
    pub fn format_link(&self, link: &LinkRecord) -> String {
        match self.format {
            OutputFormat::Text => format!("Found link: {} ({})", link.url, link.text),
            OutputFormat::Json => serde_json::to_string(link).unwrap_or_default(),
            OutputFormat::Csv => csv_row(&[&link.url, &link.text]),
        }
    }

    /// Formats one content record
    pub fn format_content(&self, content: &ContentRecord) -> String {
        match self.format {
            OutputFormat::Text => format!(
                "Extracted content from {} ({}):\n{}",
                content.url, content.selector, content.formatted
            ),
            OutputFormat::Json => serde_json::to_string(content).unwrap_or_default(),
            OutputFormat::Csv => csv_row(&[&content.url, &content.selector, &content.formatted]),
        }
    }
}

impl CrawlObserver for ConsoleObserver {
    fn on_link(&self, link: &LinkRecord) {
        println!("{}", self.format_link(link));
    }

    fn on_content(&self, content: &ContentRecord) {
        println!("{}", self.format_content(content));
    }

    fn on_failure(&self, url: &Url, error: &CrawlerError) {
        eprintln!("Error crawling {}: {}", url, error);
    }
}

fn csv_row(fields: &[&str]) -> String {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if writer.write_record(fields).is_err() {
        return fields.join(",");
    }
    match writer.into_inner() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim_end().to_string(),
        Err(_) => fields.join(","),
    }
}
