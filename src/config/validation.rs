use crate::config::types::CrawlerConfig;
use crate::extract::ContentExtractor;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_base_url(config)?;
    validate_limits(config)?;
    validate_http(config)?;
    validate_selectors(config)?;
    Ok(())
}

/// The base URL must be a fetchable http(s) URL with a host
fn validate_base_url(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = &config.base_url;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}

fn validate_limits(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 {
        return Err(ConfigError::NotPositive {
            name: "max_concurrency",
            value: config.max_concurrency.to_string(),
        });
    }

    if config.max_pages < 1 {
        return Err(ConfigError::NotPositive {
            name: "max_pages",
            value: config.max_pages.to_string(),
        });
    }

    Ok(())
}

fn validate_http(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.http.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    if config.http.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Every selector must compile in the configured dialect
fn validate_selectors(config: &CrawlerConfig) -> Result<(), ConfigError> {
    ContentExtractor::new(&config.selectors, config.selector_type, config.output_format)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            dialect: config.selector_type.to_string(),
            pattern: e.pattern().unwrap_or_default().to_string(),
            reason: e.to_string(),
        })
}
