use crate::config::types::{CrawlerConfig, FileConfig, OutputFormat, SelectorType};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Usage line shown alongside configuration errors
pub const USAGE: &str = "usage: crawler <base_url> <max_concurrency> <max_pages> \
[selectors=s1,s2,...] [selector_type=css|xpath|regex] [output_format=text|json|csv] \
[filter=substring] [same_origin=true|false] [user_agent=UA] [timeout=SECS] [database=PATH]";

/// Loads optional defaults from a TOML file
///
/// # Arguments
///
/// * `path` - Path to the TOML file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully loaded defaults
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Builds and validates a configuration from command-line arguments
///
/// `args` holds the arguments after the program name: three positionals
/// (`base_url`, `max_concurrency`, `max_pages`) followed by `key=value`
/// options. Defaults from `file` are applied first, then overridden by the
/// options.
///
/// # Returns
///
/// * `Ok(CrawlerConfig)` - Fully resolved configuration
/// * `Err(ConfigError)` - Missing or malformed arguments
pub fn parse_args<S: AsRef<str>>(
    args: &[S],
    file: Option<&FileConfig>,
) -> Result<CrawlerConfig, ConfigError> {
    if args.len() < 3 {
        return Err(ConfigError::Validation(USAGE.to_string()));
    }

    let raw_url = args[0].as_ref();
    let base_url = Url::parse(raw_url).map_err(|e| ConfigError::InvalidUrl {
        url: raw_url.to_string(),
        reason: e.to_string(),
    })?;
    let max_concurrency = parse_positive("max_concurrency", args[1].as_ref())?;
    let max_pages = parse_positive("max_pages", args[2].as_ref())?;

    let mut config = CrawlerConfig::new(base_url, max_concurrency, max_pages);

    if let Some(file) = file {
        apply_file_defaults(&mut config, file);
    }

    for option in &args[3..] {
        apply_option(&mut config, option.as_ref())?;
    }

    validate(&config)?;

    Ok(config)
}

fn parse_positive(name: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::NotPositive {
            name,
            value: value.to_string(),
        }),
    }
}

fn apply_file_defaults(config: &mut CrawlerConfig, file: &FileConfig) {
    if let Some(selectors) = &file.selectors {
        config.selectors = selectors.clone();
    }
    if let Some(selector_type) = file.selector_type {
        config.selector_type = selector_type;
    }
    if let Some(output_format) = file.output_format {
        config.output_format = output_format;
    }
    if let Some(filter) = &file.filter {
        config.filter = Some(filter.clone());
    }
    if let Some(same_origin) = file.same_origin {
        config.same_origin = same_origin;
    }
    if let Some(user_agent) = &file.user_agent {
        config.http.user_agent = user_agent.clone();
    }
    if let Some(timeout) = file.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(path) = &file.database_path {
        config.database_path = Some(path.clone());
    }
}

fn apply_option(config: &mut CrawlerConfig, option: &str) -> Result<(), ConfigError> {
    let (key, value) = option
        .split_once('=')
        .ok_or_else(|| ConfigError::UnknownOption(option.to_string()))?;

    let invalid = || ConfigError::InvalidOption {
        key: key.to_string(),
        value: value.to_string(),
    };

    match key.trim() {
        "selectors" => config.selectors = split_selectors(value),
        "selector_type" => {
            config.selector_type = value.parse::<SelectorType>().map_err(|_| invalid())?
        }
        "output_format" => {
            config.output_format = value.parse::<OutputFormat>().map_err(|_| invalid())?
        }
        "filter" => config.filter = Some(value.to_string()),
        "same_origin" => {
            config.same_origin = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid()),
            }
        }
        "user_agent" => config.http.user_agent = value.to_string(),
        "timeout" => config.http.timeout_secs = value.trim().parse().map_err(|_| invalid())?,
        "database" => config.database_path = Some(value.to_string()),
        _ => return Err(ConfigError::UnknownOption(option.to_string())),
    }

    Ok(())
}

/// Splits a comma-separated selector list
///
/// Commas nested in brackets, parentheses, braces or quotes belong to the
/// selector itself, so `//a[contains(@href,'x')],h1` yields two selectors.
fn split_selectors(value: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;

    for c in value.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => selectors.push(std::mem::take(&mut current)),
                _ => current.push(c),
            },
        }
    }
    selectors.push(current);

    selectors
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
