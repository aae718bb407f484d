//! URL handling module
//!
//! This module provides dedup-key normalization and host comparison for the
//! same-origin policy.

mod domain;
mod normalize;

pub use domain::{extract_host, is_same_origin};
pub use normalize::{normalize_parsed, normalize_url};
