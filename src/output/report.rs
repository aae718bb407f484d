//! Final crawl report
//!
//! Produced once the crawl has drained. Visited pages are listed by
//! normalized URL in ascending order together with how many times each was
//! encountered.

use crate::config::OutputFormat;
use crate::output::{OutputError, StatsSnapshot};
use crate::state::{ContentRecord, LinkRecord};
use serde::Serialize;
use std::fmt::Write as _;

const RULE: &str = "=============================";

/// A distinct page and its encounter count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitedPage {
    /// Normalized URL
    pub url: String,
    pub count: usize,
}

/// Everything a finished crawl produced
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub base_url: String,

    /// Sorted by normalized URL
    pub visited: Vec<VisitedPage>,

    pub links: Vec<LinkRecord>,
    pub contents: Vec<ContentRecord>,
    pub stats: StatsSnapshot,
}

impl CrawlReport {
    /// Total encounters across all visited pages
    pub fn total_encounters(&self) -> usize {
        self.visited.iter().map(|page| page.count).sum()
    }

    /// Renders the report in the requested format
    ///
    /// # Arguments
    ///
    /// * `format` - `text` for the human-readable report, `json` for the
    ///   whole report as one document, `csv` for `url,count` rows
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The rendered report
    /// * `Err(OutputError)` - Serialization failed
    pub fn render(&self, format: OutputFormat) -> Result<String, OutputError> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Csv => self.render_csv(),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();

        if !self.links.is_empty() {
            out.push_str("Crawl results:\n");
            for link in &self.links {
                let _ = writeln!(out, "URL: {}\nDescription: {}\n", link.url, link.text);
            }
        }

        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "REPORT for {}", self.base_url);
        let _ = writeln!(out, "{}", RULE);
        for page in &self.visited {
            let _ = writeln!(out, "Found {} internal links to {}", page.count, page.url);
        }
        out
    }

    fn render_csv(&self) -> Result<String, OutputError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["url", "count"])?;
        for page in &self.visited {
            writer.write_record([page.url.as_str(), page.count.to_string().as_str()])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| OutputError::Format(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| OutputError::Format(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> CrawlReport {
        CrawlReport {
            base_url: "https://example.com/".to_string(),
            visited: vec![
                VisitedPage {
                    url: "example.com".to_string(),
                    count: 3,
                },
                VisitedPage {
                    url: "example.com/about".to_string(),
                    count: 1,
                },
            ],
            links: vec![LinkRecord {
                url: "https://example.com/about".to_string(),
                text: "About".to_string(),
            }],
            contents: Vec::new(),
            stats: StatsSnapshot::default(),
        }
    }

    #[test]
    fn test_text_report() {
        let text = report().render(OutputFormat::Text).unwrap();
        let expected = "\
Crawl results:
URL: https://example.com/about
Description: About

=============================
REPORT for https://example.com/
=============================
Found 3 internal links to example.com
Found 1 internal links to example.com/about
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_json_report() {
        let json = report().render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["base_url"], "https://example.com/");
        assert_eq!(value["visited"][0]["url"], "example.com");
        assert_eq!(value["visited"][0]["count"], 3);
        assert_eq!(value["links"][0]["text"], "About");
    }

    #[test]
    fn test_csv_report() {
        let csv = report().render(OutputFormat::Csv).unwrap();
        assert_eq!(csv, "url,count\nexample.com,3\nexample.com/about,1\n");
    }

    #[test]
    fn test_total_encounters() {
        assert_eq!(report().total_encounters(), 4);
    }
}
