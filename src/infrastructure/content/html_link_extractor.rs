//! Outbound link extraction from rendered post content.

use std::collections::HashSet;
use url::Url;

use crate::protocol::html;
use crate::utils::url_normalizer::{comparison_key, parse_absolute_url};

/// Supplies the pages a freshly published post links to.
#[cfg_attr(test, mockall::automock)]
pub trait LinkExtractor: Send + Sync {
    /// Returns the distinct outbound targets of `content`, in document order.
    fn extract(&self, post_url: &Url, content: &str) -> Vec<Url>;
}

/// Collects `<a href>` targets from an HTML post body.
///
/// Relative hrefs are resolved against the post URL. Only HTTP(S) links are
/// kept, duplicates are dropped and links back to the post itself are
/// skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, post_url: &Url, content: &str) -> Vec<Url> {
        let mut seen = HashSet::from([comparison_key(post_url)]);

        html::anchor_hrefs(content)
            .iter()
            .filter_map(|href| post_url.join(href).ok())
            .filter_map(|link| parse_absolute_url(link.as_str()).ok())
            .filter(|link| seen.insert(comparison_key(link)))
            .collect()
    }
}
