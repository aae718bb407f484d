use crate::extract::ExtractError;
use scraper::{Html, Selector};

pub(super) fn compile(pattern: &str) -> Result<Selector, ExtractError> {
    Selector::parse(pattern).map_err(|e| ExtractError::InvalidCss {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Trimmed text content of every element matching `selector`
pub(super) fn select(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect()
}
