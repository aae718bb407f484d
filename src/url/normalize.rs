use crate::UrlError;
use url::Url;

/// Normalizes a URL into its deduplication key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Drop the scheme (`http://` and `https://` map to the same key)
/// 3. Lowercase the host and remove a leading `www.` label
/// 4. Keep a non-default port
/// 5. Remove a single trailing slash from the path (the root path `/`
///    therefore disappears entirely)
/// 6. Drop the fragment
/// 7. Keep the query string verbatim, separated by `?`
///
/// Query strings distinguish pages: `/path?x=1` and `/path` are different keys.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(String)` - The dedup key
/// * `Err(UrlError)` - The input is not a valid absolute URL with a host
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize_url;
///
/// let key = normalize_url("http://www.blog.x.dev/path/").unwrap();
/// assert_eq!(key, "blog.x.dev/path");
/// assert_eq!(normalize_url("https://x.com/p?q=1").unwrap(), "x.com/p?q=1");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse {
        url: url_str.to_string(),
        reason: e.to_string(),
    })?;

    normalize_parsed(&url)
}

/// Normalizes an already parsed URL
///
/// Equivalent to [`normalize_url`] without the parsing step.
pub fn normalize_parsed(url: &Url) -> Result<String, UrlError> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))?
        .to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let mut key = String::with_capacity(url.as_str().len());
    key.push_str(host);

    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    let path = url.path();
    key.push_str(path.strip_suffix('/').unwrap_or(path));

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }

    Ok(key)
}
