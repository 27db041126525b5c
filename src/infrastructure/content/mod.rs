//! Outbound link extraction from published posts.

mod html_link_extractor;

pub use html_link_extractor::{HtmlLinkExtractor, LinkExtractor};

#[cfg(test)]
pub use html_link_extractor::MockLinkExtractor;
