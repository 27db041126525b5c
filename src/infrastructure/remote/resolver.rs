//! Pingback endpoint discovery for outbound notifications.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::client::{MAX_PAGE_BYTES, content_type, read_body_capped};
use crate::protocol::html;
use crate::utils::url_normalizer::parse_absolute_url;

/// Response header advertising a pingback endpoint.
pub const X_PINGBACK: &str = "x-pingback";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("target {url} is unreachable: {reason}")]
    TargetUnreachable { url: String, reason: String },
}

/// Discovers the XML-RPC endpoint a target page wants pingbacks sent to.
///
/// Endpoints are looked up on every call and never cached.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Returns the endpoint of `target`, or `None` if it does not support
    /// pingbacks.
    ///
    /// An `X-Pingback` header takes priority over a `<link rel="pingback">`
    /// element in the page, even when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::TargetUnreachable`] on network errors, on
    /// timeout and on non-2xx responses.
    async fn resolve_endpoint(
        &self,
        target: &Url,
        timeout: Duration,
    ) -> Result<Option<Url>, ResolveError>;
}

pub struct HttpTargetResolver {
    client: Client,
}

impl HttpTargetResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TargetResolver for HttpTargetResolver {
    async fn resolve_endpoint(
        &self,
        target: &Url,
        timeout: Duration,
    ) -> Result<Option<Url>, ResolveError> {
        let unreachable = |reason: String| ResolveError::TargetUnreachable {
            url: target.to_string(),
            reason,
        };

        let response = self
            .client
            .get(target.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unreachable(format!("HTTP {status}")));
        }

        let header = response
            .headers()
            .get(X_PINGBACK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(value) = header {
            match parse_absolute_url(&value) {
                Ok(endpoint) => {
                    tracing::debug!(target_url = %target, endpoint = %endpoint, "Endpoint from X-Pingback header");
                    return Ok(Some(endpoint));
                }
                Err(e) => {
                    tracing::debug!(target_url = %target, header = %value, "Ignoring invalid X-Pingback header: {}", e);
                }
            }
        }

        let content_type = content_type(&response);
        let body = read_body_capped(response, MAX_PAGE_BYTES)
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        let body = String::from_utf8_lossy(&body);

        let declared_html = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
        if !declared_html && !html::looks_like_html(&body) {
            return Ok(None);
        }

        let endpoint = discover_link_endpoint(target, &body);
        if let Some(endpoint) = &endpoint {
            tracing::debug!(target_url = %target, endpoint = %endpoint, "Endpoint from link element");
        }
        Ok(endpoint)
    }
}

/// Finds the `<link rel="pingback">` endpoint in an HTML page.
///
/// Relative hrefs are resolved against `base`. Only HTTP(S) endpoints are
/// returned.
pub fn discover_link_endpoint(base: &Url, body: &str) -> Option<Url> {
    let href = html::pingback_link_href(body)?;
    let resolved = base.join(&href).ok()?;
    parse_absolute_url(resolved.as_str()).ok()
}
