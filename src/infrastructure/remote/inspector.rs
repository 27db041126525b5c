//! Source page inspection for inbound pingbacks.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::client::{MAX_PAGE_BYTES, content_type, read_body_capped};
use crate::protocol::html;
use crate::utils::url_normalizer::same_resource;

/// What was learned from fetching a pingback source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionResult {
    pub is_html: bool,
    pub contains_target_link: bool,
    pub title: Option<String>,
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("source {url} is unreachable: {reason}")]
    SourceUnreachable { url: String, reason: String },
}

/// Fetches a source page and checks it for a link to the target.
///
/// # Implementations
///
/// - [`HttpSourceInspector`] - single HTTP GET through reqwest
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceInspector: Send + Sync {
    /// Fetches `source` once and reports whether it links to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::SourceUnreachable`] on network errors, on
    /// timeout and on non-2xx responses. Failed fetches are never retried.
    async fn inspect(
        &self,
        source: &Url,
        target: &Url,
        timeout: Duration,
    ) -> Result<InspectionResult, InspectError>;
}

pub struct HttpSourceInspector {
    client: Client,
}

impl HttpSourceInspector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceInspector for HttpSourceInspector {
    async fn inspect(
        &self,
        source: &Url,
        target: &Url,
        timeout: Duration,
    ) -> Result<InspectionResult, InspectError> {
        let unreachable = |reason: String| InspectError::SourceUnreachable {
            url: source.to_string(),
            reason,
        };

        let response = self
            .client
            .get(source.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unreachable(format!("HTTP {status}")));
        }

        let content_type = content_type(&response);
        let body = read_body_capped(response, MAX_PAGE_BYTES)
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        let body = String::from_utf8_lossy(&body);

        let result = examine(source, target, content_type.as_deref(), &body);
        tracing::debug!(
            source = %source,
            is_html = result.is_html,
            contains_target_link = result.contains_target_link,
            "Source inspected"
        );
        Ok(result)
    }
}

/// Classifies a fetched source body.
///
/// The body counts as HTML when the content type says `text/html` or the
/// document starts with a doctype or `<html>` element. Plain text never
/// counts as linking to the target. Anchor hrefs are resolved against the
/// first `<base href>` when the page declares one, else against the source
/// URL.
pub fn examine(
    source: &Url,
    target: &Url,
    content_type: Option<&str>,
    body: &str,
) -> InspectionResult {
    let declared_html = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false);
    let is_html = declared_html || html::looks_like_html(body);

    if !is_html {
        return InspectionResult {
            is_html: false,
            contains_target_link: false,
            title: None,
        };
    }

    let base = html::base_href(body)
        .and_then(|href| source.join(&href).ok())
        .unwrap_or_else(|| source.clone());

    let contains_target_link = html::anchor_hrefs(body)
        .iter()
        .filter_map(|href| base.join(href).ok())
        .any(|link| same_resource(&link, target));

    InspectionResult {
        is_html,
        contains_target_link,
        title: html::extract_title(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> (Url, Url) {
        (
            Url::parse("https://source.example/articles/reply").unwrap(),
            Url::parse("https://blog.example/2024/hello").unwrap(),
        )
    }

    #[test]
    fn test_examine_absolute_link() {
        let (source, target) = urls();
        let body = r#"<html><head><title>A reply</title></head>
            <body><a href="https://BLOG.example/2024/hello/#comments">nice post</a></body></html>"#;

        let result = examine(&source, &target, Some("text/html; charset=utf-8"), body);

        assert!(result.is_html);
        assert!(result.contains_target_link);
        assert_eq!(result.title.as_deref(), Some("A reply"));
    }

    #[test]
    fn test_examine_relative_link_resolves_against_source() {
        let source = Url::parse("https://blog.example/2024/other").unwrap();
        let target = Url::parse("https://blog.example/2024/hello").unwrap();
        let body = r#"<html><body><a href="hello">sibling</a></body></html>"#;

        assert!(examine(&source, &target, None, body).contains_target_link);
    }

    #[test]
    fn test_examine_relative_link_resolves_against_base() {
        let source = Url::parse("https://mirror.example/copies/reply").unwrap();
        let target = Url::parse("https://blog.example/2024/hello").unwrap();
        let body = r#"<html><head><base href="https://blog.example/2024/"></head>
            <body><a href="hello">original</a></body></html>"#;

        assert!(examine(&source, &target, None, body).contains_target_link);
    }

    #[test]
    fn test_examine_angle_bracket_in_attribute() {
        let (source, target) = urls();
        let body = r#"<a title="a -> b" href="https://blog.example/2024/hello">x</a>"#;

        assert!(examine(&source, &target, Some("text/html"), body).contains_target_link);
    }

    #[test]
    fn test_examine_without_link() {
        let (source, target) = urls();
        let body = r#"<html><body><a href="https://blog.example/2024/other">x</a></body></html>"#;

        let result = examine(&source, &target, Some("text/html"), body);

        assert!(result.is_html);
        assert!(!result.contains_target_link);
        assert_eq!(result.title, None);
    }

    #[test]
    fn test_examine_plain_text_never_links() {
        let (source, target) = urls();
        let body = "See https://blog.example/2024/hello for details";

        let result = examine(&source, &target, Some("text/plain"), body);

        assert_eq!(
            result,
            InspectionResult {
                is_html: false,
                contains_target_link: false,
                title: None
            }
        );
    }

    #[test]
    fn test_examine_sniffs_html_without_content_type() {
        let (source, target) = urls();
        let body = r#"<!DOCTYPE html><html><a href="https://blog.example/2024/hello">x</a></html>"#;

        let result = examine(&source, &target, Some("application/octet-stream"), body);

        assert!(result.is_html);
        assert!(result.contains_target_link);
    }
}
