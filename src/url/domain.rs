use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// The port is not part of the host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Checks whether a candidate URL shares the base URL's host
///
/// Only the host is compared; scheme and port may differ. A leading `www.`
/// label is ignored on both sides, as in the dedup key, so a site that
/// redirects to its `www.` form stays in scope. URLs without a host never
/// match.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::is_same_origin;
///
/// let base = Url::parse("http://example.com/").unwrap();
/// assert!(is_same_origin(&base, &Url::parse("https://www.example.com/a").unwrap()));
/// assert!(!is_same_origin(&base, &Url::parse("https://blog.example.com/").unwrap()));
/// ```
pub fn is_same_origin(base: &Url, candidate: &Url) -> bool {
    match (extract_host(base), extract_host(candidate)) {
        (Some(base_host), Some(candidate_host)) => {
            strip_www(&base_host) == strip_www(&candidate_host)
        }
        _ => false,
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
