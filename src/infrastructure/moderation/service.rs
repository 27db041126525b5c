//! Content moderator trait.

use async_trait::async_trait;

/// Decides whether inbound pingback content is spam.
///
/// Moderation is best effort. Implementations must not return errors: a
/// moderator that cannot reach its backend reports "not spam" so pingbacks
/// are never blocked by moderation downtime.
///
/// # Implementations
///
/// - [`crate::infrastructure::moderation::NullModerator`] - accepts everything
/// - [`crate::infrastructure::moderation::HttpModerator`] - remote detect API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentModerator: Send + Sync {
    /// Returns true if any of `texts` is flagged.
    async fn is_spam(&self, texts: &[String]) -> bool;

    /// Short name reported by the health check.
    fn name(&self) -> &'static str;
}
