//! Spam moderation for inbound pingbacks.
//!
//! Provides a [`ContentModerator`] trait with two implementations:
//! - [`HttpModerator`] - remote detect API, fails open
//! - [`NullModerator`] - no-op implementation when moderation is disabled

mod http_moderator;
mod null_moderator;
mod service;

pub use http_moderator::HttpModerator;
pub use null_moderator::NullModerator;
pub use service::ContentModerator;

#[cfg(test)]
pub use service::MockContentModerator;
