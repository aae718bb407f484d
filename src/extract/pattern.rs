use crate::extract::ExtractError;
use regex::Regex;

pub(super) fn compile(pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|source| ExtractError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// First capture group of every match
///
/// Patterns without a capture group, and matches where the group did not
/// participate, contribute nothing.
pub(super) fn captures(regex: &Regex, haystack: &str) -> Vec<String> {
    regex
        .captures_iter(haystack)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
