//! HTML parser for discovering links
//!
//! This module walks a parsed document's node tree with an explicit
//! iterator and yields every anchor with an `href`. Two views are built on
//! top of it:
//! - `discover_links`: every resolvable outbound URL, used for traversal and
//!   never filtered
//! - `discover_link_records`: URL plus anchor text, optionally restricted to
//!   URLs containing a filter substring, used for reporting

use crate::state::LinkRecord;
use scraper::{ElementRef, Html};
use url::Url;

/// An `<a href>` element found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The raw `href` attribute value
    pub href: String,

    /// All descendant text of the anchor, trimmed
    pub text: String,
}

/// A parsed HTML document
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    /// Parses an HTML body; malformed markup is recovered, never rejected
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// The underlying scraper document
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Iterates over every anchor carrying an `href`, in document order
    pub fn anchors(&self) -> Anchors<'_> {
        Anchors {
            elements: Box::new(
                self.html
                    .root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap),
            ),
        }
    }

    /// Absolute URLs of every resolvable link, unfiltered
    pub fn links(&self, base_url: &Url) -> Vec<Url> {
        self.anchors()
            .filter_map(|anchor| resolve_link(&anchor.href, base_url))
            .collect()
    }

    /// Link records for resolvable links whose URL contains `filter`
    ///
    /// A `None` or empty filter keeps every link.
    pub fn link_records(&self, base_url: &Url, filter: Option<&str>) -> Vec<LinkRecord> {
        let filter = filter.filter(|f| !f.is_empty());

        self.anchors()
            .filter_map(|anchor| {
                let url = resolve_link(&anchor.href, base_url)?;
                Some(LinkRecord {
                    url: url.to_string(),
                    text: anchor.text,
                })
            })
            .filter(|record| filter.map_or(true, |f| record.url.contains(f)))
            .collect()
    }
}

/// Iterator over the anchors of a [`ParsedDocument`]
pub struct Anchors<'a> {
    elements: Box<dyn Iterator<Item = ElementRef<'a>> + 'a>,
}

impl Iterator for Anchors<'_> {
    type Item = Anchor;

    fn next(&mut self) -> Option<Anchor> {
        for element in self.elements.by_ref() {
            if !element.value().name().eq_ignore_ascii_case("a") {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                return Some(Anchor {
                    href: href.to_string(),
                    text: element.text().collect::<String>().trim().to_string(),
                });
            }
        }
        None
    }
}

/// Resolves a link href against `base_url`
///
/// Returns None if the link should be skipped:
/// - empty hrefs
/// - references that fail to resolve
/// - anything that is not HTTP(S) after resolution (mailto:, javascript:, ...)
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}

/// Parses `body` and returns every resolvable outbound URL
///
/// # Arguments
///
/// * `body` - The HTML content
/// * `base_url` - The URL the content was served from
///
/// # Example
///
/// ```
/// use sitecrawl::crawler::discover_links;
/// use url::Url;
///
/// let html = r#"<a href="/page">Link</a><a href="mailto:me@example.com">Mail</a>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = discover_links(html, &base_url);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn discover_links(body: &str, base_url: &Url) -> Vec<Url> {
    ParsedDocument::parse(body).links(base_url)
}

/// Parses `body` and returns link records whose URL contains `filter`
pub fn discover_link_records(body: &str, base_url: &Url, filter: Option<&str>) -> Vec<LinkRecord> {
    ParsedDocument::parse(body).link_records(base_url, filter)
}
