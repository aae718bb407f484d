//! Visited registry: the page budget and dedup authority of a crawl
//!
//! All admission decisions go through [`VisitedRegistry::admit`], which checks
//! the budget, checks for an existing entry and inserts or increments in one
//! critical section.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Outcome of an admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First visit; the caller must expand this page
    New,

    /// Already visited; carries the updated encounter count
    Revisited(usize),

    /// The registry is full; nothing was recorded
    BudgetExhausted,
}

impl Admission {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}

/// Mapping from normalized URL to visit count, capped at `max_pages` keys
#[derive(Debug)]
pub struct VisitedRegistry {
    pages: Mutex<HashMap<String, usize>>,
    max_pages: usize,
}

impl VisitedRegistry {
    pub fn new(max_pages: usize) -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            max_pages,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        // Every critical section leaves the map consistent, so a poisoned
        // lock still guards valid data.
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically admits a normalized URL
    ///
    /// The budget check happens before anything else: once the registry holds
    /// `max_pages` keys every call returns [`Admission::BudgetExhausted`]
    /// without mutation, including calls for keys already present.
    pub fn admit(&self, key: &str) -> Admission {
        let mut pages = self.lock();

        if pages.len() >= self.max_pages {
            return Admission::BudgetExhausted;
        }

        if let Some(count) = pages.get_mut(key) {
            *count += 1;
            return Admission::Revisited(*count);
        }

        pages.insert(key.to_string(), 1);
        Admission::New
    }

    /// Admits `key` only if it is already present
    ///
    /// Returns `None` without mutation when the key is unknown and budget
    /// remains. Otherwise the outcome is exactly what [`admit`](Self::admit)
    /// would return, so a caller can settle a known page before fetching it.
    pub fn readmit(&self, key: &str) -> Option<Admission> {
        let mut pages = self.lock();

        if pages.len() >= self.max_pages {
            return Some(Admission::BudgetExhausted);
        }

        pages.get_mut(key).map(|count| {
            *count += 1;
            Admission::Revisited(*count)
        })
    }

    /// Returns true only when `key` was newly admitted
    pub fn try_admit(&self, key: &str) -> bool {
        self.admit(key).is_new()
    }

    /// Returns true once the page budget is used up
    pub fn is_exhausted(&self) -> bool {
        self.lock().len() >= self.max_pages
    }

    /// Number of distinct pages recorded
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Encounter count for a key, if present
    pub fn count(&self, key: &str) -> Option<usize> {
        self.lock().get(key).copied()
    }

    /// Copies the registry out, sorted by normalized URL
    pub fn snapshot(&self) -> Vec<(String, usize)> {
        let mut entries: Vec<(String, usize)> = self
            .lock()
            .iter()
            .map(|(url, count)| (url.clone(), *count))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
