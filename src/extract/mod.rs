//! Content extraction with CSS, XPath or regex selectors
//!
//! Selectors are compiled once, when the extractor is built, so a malformed
//! selector is reported at startup rather than on every page. Extraction
//! itself never affects the link traversal.

mod css;
mod format;
mod pattern;
mod xpath;

pub use format::format_matches;
pub use xpath::XPathExpr;

use crate::config::{OutputFormat, SelectorType};
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

/// Errors raised while compiling selectors or formatting matches
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid CSS selector '{pattern}': {reason}")]
    InvalidCss { pattern: String, reason: String },

    #[error("invalid XPath expression '{pattern}': {reason}")]
    InvalidXPath { pattern: String, reason: String },

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to format matches: {0}")]
    Format(String),
}

impl ExtractError {
    /// The selector that failed to compile, if any
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::InvalidCss { pattern, .. }
            | Self::InvalidXPath { pattern, .. }
            | Self::InvalidRegex { pattern, .. } => Some(pattern),
            Self::Format(_) => None,
        }
    }
}

/// Matches produced by one selector on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub selector: String,
    pub matches: Vec<String>,
    /// Matches rendered in the extractor's output format
    pub formatted: String,
}

#[derive(Debug)]
enum Matcher {
    Css(Selector),
    XPath(XPathExpr),
    Regex(Regex),
}

#[derive(Debug)]
struct CompiledSelector {
    pattern: String,
    matcher: Matcher,
}

/// A set of compiled selectors sharing one dialect and output format
#[derive(Debug)]
pub struct ContentExtractor {
    selectors: Vec<CompiledSelector>,
    format: OutputFormat,
}

impl ContentExtractor {
    /// Compiles every pattern in the given dialect
    ///
    /// # Returns
    ///
    /// * `Ok(ContentExtractor)` - All patterns compiled
    /// * `Err(ExtractError)` - The first pattern that failed to compile
    pub fn new(
        patterns: &[String],
        dialect: SelectorType,
        format: OutputFormat,
    ) -> Result<Self, ExtractError> {
        let selectors = patterns
            .iter()
            .map(|pattern| {
                let matcher = match dialect {
                    SelectorType::Css => Matcher::Css(css::compile(pattern)?),
                    SelectorType::Xpath => Matcher::XPath(XPathExpr::parse(pattern).map_err(
                        |reason| ExtractError::InvalidXPath {
                            pattern: pattern.clone(),
                            reason,
                        },
                    )?),
                    SelectorType::Regex => Matcher::Regex(pattern::compile(pattern)?),
                };
                Ok(CompiledSelector {
                    pattern: pattern.clone(),
                    matcher,
                })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self { selectors, format })
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Parses `html` and applies every selector
    pub fn extract(&self, html: &str) -> Result<Vec<Extracted>, ExtractError> {
        let document = Html::parse_document(html);
        self.extract_from(&document, html)
    }

    /// Applies every selector to an already parsed document
    ///
    /// CSS and XPath selectors run against `document`; regex selectors run
    /// against the raw `html`. Selectors with no matches are omitted.
    pub fn extract_from(
        &self,
        document: &Html,
        html: &str,
    ) -> Result<Vec<Extracted>, ExtractError> {
        let mut results = Vec::new();

        for selector in &self.selectors {
            let matches = match &selector.matcher {
                Matcher::Css(css) => css::select(document, css),
                Matcher::XPath(expr) => expr.evaluate(document),
                Matcher::Regex(regex) => pattern::captures(regex, html),
            };

            if matches.is_empty() {
                tracing::debug!("No content matched '{}'", selector.pattern);
                continue;
            }

            let formatted = format_matches(&matches, self.format)?;
            results.push(Extracted {
                selector: selector.pattern.clone(),
                matches,
                formatted,
            });
        }

        Ok(results)
    }
}
