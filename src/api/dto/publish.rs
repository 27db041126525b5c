//! DTOs for the post-published hook.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::PingbackSendOutcome;

/// Notification that a post went live.
#[derive(Debug, Deserialize, Validate)]
pub struct PublishRequest {
    /// Public URL of the post (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Rendered HTML body; every outbound link in it is notified.
    #[validate(length(max = 1048576, message = "Content is too large"))]
    #[serde(default)]
    pub content: String,
}

/// Response containing the batch of outbound notifications.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub url: String,
    /// False when the URL was already registered as a target.
    pub newly_published: bool,
    pub summary: NotifySummary,
    pub items: Vec<NotifyResultItem>,
}

/// Counts per outcome kind.
#[derive(Debug, Default, Serialize)]
pub struct NotifySummary {
    pub total: usize,
    pub sent: usize,
    /// Targets without a pingback endpoint.
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome of notifying one linked page.
#[derive(Debug, Serialize)]
pub struct NotifyResultItem {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_code: Option<i32>,
}

impl From<PingbackSendOutcome> for NotifyResultItem {
    fn from(o: PingbackSendOutcome) -> Self {
        Self {
            target: o.target,
            endpoint: o.endpoint,
            sent: o.sent,
            response_status: o.response_status,
            error: o.error.map(|kind| kind.as_str()),
            fault_code: o.fault_code,
        }
    }
}

impl NotifySummary {
    pub fn from_outcomes(outcomes: &[PingbackSendOutcome]) -> Self {
        outcomes.iter().fold(
            Self {
                total: outcomes.len(),
                ..Self::default()
            },
            |mut summary, o| {
                match (o.sent, o.error) {
                    (true, _) => summary.sent += 1,
                    (false, None) => summary.skipped += 1,
                    (false, Some(_)) => summary.failed += 1,
                }
                summary
            },
        )
    }
}
