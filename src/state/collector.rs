//! Bounded collections of reported links and extracted content
//!
//! Both lists are append-only and capped independently at the page budget.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A discovered link and its anchor text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
}

/// Content extracted from one page with one selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    pub url: String,
    pub selector: String,
    pub matches: Vec<String>,
    /// Matches rendered in the configured output format
    pub formatted: String,
}

/// An append-only list that stops accepting items at its limit
#[derive(Debug)]
struct BoundedList<T> {
    items: Mutex<Vec<T>>,
    limit: usize,
}

impl<T: Clone> BoundedList<T> {
    fn new(limit: usize) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Size check and append share one critical section
    fn push(&self, item: T) -> bool {
        let mut items = self.lock();
        if items.len() >= self.limit {
            return false;
        }
        items.push(item);
        true
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }
}

/// Accumulates link records and content fragments for one crawl
#[derive(Debug)]
pub struct LinkCollector {
    links: BoundedList<LinkRecord>,
    contents: BoundedList<ContentRecord>,
}

impl LinkCollector {
    /// Creates a collector whose link and content lists each hold `limit` items
    pub fn new(limit: usize) -> Self {
        Self {
            links: BoundedList::new(limit),
            contents: BoundedList::new(limit),
        }
    }

    /// Appends a link; returns false once the list is full
    pub fn add_link(&self, link: LinkRecord) -> bool {
        self.links.push(link)
    }

    /// Appends a content record; returns false once the list is full
    pub fn add_content(&self, content: ContentRecord) -> bool {
        self.contents.push(content)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn content_count(&self) -> usize {
        self.contents.len()
    }

    /// Links in insertion order
    pub fn links(&self) -> Vec<LinkRecord> {
        self.links.snapshot()
    }

    /// Content records in insertion order
    pub fn contents(&self) -> Vec<ContentRecord> {
        self.contents.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn link(n: usize) -> LinkRecord {
        LinkRecord {
            url: format!("https://example.com/{}", n),
            text: format!("Link {}", n),
        }
    }

    #[test]
    fn test_links_kept_in_order() {
        let collector = LinkCollector::new(10);
        assert!(collector.add_link(link(1)));
        assert!(collector.add_link(link(2)));

        let links = collector.links();
        assert_eq!(links, vec![link(1), link(2)]);
    }

    #[test]
    fn test_link_limit() {
        let collector = LinkCollector::new(2);
        assert!(collector.add_link(link(1)));
        assert!(collector.add_link(link(2)));
        assert!(!collector.add_link(link(3)));
        assert_eq!(collector.link_count(), 2);
    }

    #[test]
    fn test_content_limit_independent_of_links() {
        let collector = LinkCollector::new(1);
        assert!(collector.add_link(link(1)));
        assert!(!collector.add_link(link(2)));

        let content = ContentRecord {
            url: "https://example.com/".to_string(),
            selector: "h1".to_string(),
            matches: vec!["Title".to_string()],
            formatted: "Title".to_string(),
        };
        assert!(collector.add_content(content.clone()));
        assert!(!collector.add_content(content));
        assert_eq!(collector.content_count(), 1);
    }

    #[test]
    fn test_concurrent_appends_respect_limit() {
        let collector = Arc::new(LinkCollector::new(50));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let collector = Arc::clone(&collector);
                thread::spawn(move || {
                    (0..100)
                        .filter(|i| collector.add_link(link(t * 100 + i)))
                        .count()
                })
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 50);
        assert_eq!(collector.link_count(), 50);
    }
}
