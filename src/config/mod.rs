//! Configuration module for the crawler
//!
//! The configuration is assembled from three positional arguments, optional
//! `key=value` options and an optional TOML file of defaults.
//!
//! # Example
//!
//! ```
//! use sitecrawl::config::parse_args;
//!
//! let args = ["https://example.com", "4", "50", "filter=blog"];
//! let config = parse_args(&args, None).unwrap();
//! assert_eq!(config.max_pages, 50);
//! assert_eq!(config.link_filter(), Some("blog"));
//! ```

mod parser;
mod types;
mod validation;

pub use types::{CrawlerConfig, FileConfig, HttpSettings, OutputFormat, SelectorType};

pub use parser::{load_file_config, parse_args, USAGE};
