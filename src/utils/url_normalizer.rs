//! URL validation and comparison helpers.
//!
//! Pingback URIs arrive from untrusted XML-RPC callers and untrusted HTML, so
//! every URL is parsed into a canonical absolute form before it is compared
//! or stored.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Parses an absolute HTTP(S) URL into canonical form.
///
/// # Normalization Rules
///
/// 1. **Protocol**: Only HTTP and HTTPS are allowed
/// 2. **Hostname**: Converted to lowercase
/// 3. **Default ports**: Removed (80 for HTTP, 443 for HTTPS)
/// 4. **Fragments**: Removed (e.g., `#section`)
/// 5. **Query parameters** and **path case**: Preserved as-is
///
/// Surrounding whitespace is trimmed first.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed or relative URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
/// Returns [`UrlNormalizationError::MissingHost`] when the URL has no host.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     parse_absolute_url("HTTPS://EXAMPLE.COM:443/Path#top").unwrap().as_str(),
///     "https://example.com/Path"
/// );
/// ```
pub fn parse_absolute_url(input: &str) -> Result<Url, UrlNormalizationError> {
    let mut url = Url::parse(input.trim())
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    let Some(host) = url.host_str() else {
        return Err(UrlNormalizationError::MissingHost);
    };

    let host_lowercase = host.to_ascii_lowercase();
    if host_lowercase != host {
        url.set_host(Some(&host_lowercase)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    }

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url)
}

/// Builds the key two URLs are compared by.
///
/// Scheme and host are lowercased, default ports, user info and the fragment
/// are dropped and a trailing slash on the path is ignored, so
/// `https://Blog.example/post/` and `https://blog.example:443/post#c1` share
/// one key.
pub fn comparison_key(url: &Url) -> String {
    let scheme = url.scheme().to_ascii_lowercase();
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

    let mut key = format!("{scheme}://{host}");
    if let Some(port) = url.port_or_known_default() {
        let default = match scheme.as_str() {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        };
        if Some(port) != default {
            key.push(':');
            key.push_str(&port.to_string());
        }
    }

    key.push_str(url.path().trim_end_matches('/'));
    if let Some(query) = url.query() {
        key.push('?');
        key.push_str(query);
    }
    key
}

/// Returns true if both URLs name the same resource under [`comparison_key`].
pub fn same_resource(a: &Url, b: &Url) -> bool {
    comparison_key(a) == comparison_key(b)
}
