//! No-op moderator used when no moderation service is configured.

use super::service::ContentModerator;
use async_trait::async_trait;
use tracing::debug;

/// A moderator that never flags anything.
pub struct NullModerator;

impl NullModerator {
    pub fn new() -> Self {
        debug!("Using NullModerator (moderation disabled)");
        Self
    }
}

impl Default for NullModerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentModerator for NullModerator {
    async fn is_spam(&self, _texts: &[String]) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
