//! Validated inbound ping.

use url::Url;

/// An inbound ping whose source page has been fetched.
///
/// Built by [`crate::application::services::PingbackReceiver`] once the
/// source inspection step completes and never mutated afterwards. It is not
/// persisted itself; an accepted ping becomes a
/// [`crate::domain::entities::NewPingback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingRequest {
    pub source_url: Url,
    pub target_url: Url,
    pub title: Option<String>,
    pub contains_html: bool,
    pub source_has_link: bool,
}

impl PingRequest {
    pub fn new(
        source_url: Url,
        target_url: Url,
        title: Option<String>,
        contains_html: bool,
        source_has_link: bool,
    ) -> Self {
        Self {
            source_url,
            target_url,
            title,
            contains_html,
            source_has_link,
        }
    }

    /// Host of the source URL, empty if it has none.
    pub fn source_domain(&self) -> &str {
        self.source_url.host_str().unwrap_or_default()
    }
}
