//! Inbound `pingback.ping` validation.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use url::Url;

use crate::domain::entities::{NewPingback, PingRequest};
use crate::domain::outcome::PingbackOutcome;
use crate::domain::pingback_event::PingbackEvent;
use crate::domain::repositories::PingbackRepository;
use crate::error::AppError;
use crate::infrastructure::moderation::ContentModerator;
use crate::infrastructure::remote::{InspectionResult, SourceInspector};
use crate::protocol::html;
use crate::protocol::xmlrpc::{MethodCall, PINGBACK_METHOD};
use crate::utils::url_normalizer::{parse_absolute_url, same_resource};

/// One step of inbound validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCheck {
    /// The target is a published post or page.
    TargetExists,
    /// The pair was not accepted before.
    NotYetRegistered,
    /// The source page links to the target.
    SourceLinksToTarget,
    /// Neither the title heuristic nor the moderator flags the source.
    NotSpam,
}

/// Checks run after URL validation, in order. The first failure decides the
/// outcome.
pub const VALIDATION_CHAIN: [ValidationCheck; 4] = [
    ValidationCheck::TargetExists,
    ValidationCheck::NotYetRegistered,
    ValidationCheck::SourceLinksToTarget,
    ValidationCheck::NotSpam,
];

struct Validation {
    source: Url,
    target: Url,
    inspection: Option<InspectionResult>,
}

/// Validates inbound pingbacks and stores the accepted ones.
///
/// Every call ends in exactly one [`PingbackOutcome`]; failures never
/// surface as errors.
pub struct PingbackReceiver {
    repository: Arc<dyn PingbackRepository>,
    inspector: Arc<dyn SourceInspector>,
    moderator: Arc<dyn ContentModerator>,
    timeout: Duration,
    events: Option<mpsc::Sender<PingbackEvent>>,
}

impl PingbackReceiver {
    /// Creates a receiver.
    ///
    /// # Arguments
    ///
    /// - `repository` - published targets and stored pingbacks
    /// - `inspector` - fetches source pages
    /// - `moderator` - spam check on the source URL and title
    /// - `timeout` - limit for the source fetch
    pub fn new(
        repository: Arc<dyn PingbackRepository>,
        inspector: Arc<dyn SourceInspector>,
        moderator: Arc<dyn ContentModerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            inspector,
            moderator,
            timeout,
            events: None,
        }
    }

    /// Publishes a [`PingbackEvent`] for every accepted pingback.
    pub fn with_events(mut self, events: mpsc::Sender<PingbackEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Handles a decoded XML-RPC call.
    ///
    /// Anything other than `pingback.ping` with at least two parameters is
    /// an [`PingbackOutcome::InvalidPingRequest`].
    pub async fn handle_call(&self, call: &MethodCall, source_ip: Option<IpAddr>) -> PingbackOutcome {
        if call.method_name != PINGBACK_METHOD {
            tracing::info!(method = %call.method_name, "Rejected call to unsupported method");
            return self.finish(PingbackOutcome::InvalidPingRequest);
        }

        match call.params.as_slice() {
            [source, target, ..] => self.ping(source, target, source_ip).await,
            _ => {
                tracing::info!(params = call.params.len(), "Rejected pingback with missing parameters");
                self.finish(PingbackOutcome::InvalidPingRequest)
            }
        }
    }

    /// Validates a ping from `source` to `target` and stores it on success.
    ///
    /// # Validation Order
    ///
    /// 1. Both URIs are absolute HTTP(S) URIs and differ
    /// 2. Then each step of [`VALIDATION_CHAIN`]
    /// 3. Commit; a concurrent duplicate insert is reported as already registered
    pub async fn ping(&self, source: &str, target: &str, source_ip: Option<IpAddr>) -> PingbackOutcome {
        let Some(mut validation) = parse_pair(source, target) else {
            tracing::info!(source, target_url = target, "Rejected malformed pingback URIs");
            return self.finish(PingbackOutcome::InvalidPingRequest);
        };

        for check in VALIDATION_CHAIN {
            if let Err(outcome) = self.run_check(check, &mut validation).await {
                tracing::info!(
                    source = %validation.source,
                    target_url = %validation.target,
                    check = ?check,
                    outcome = outcome.as_str(),
                    "Pingback rejected"
                );
                return self.finish(outcome);
            }
        }

        let outcome = self.commit(validation, source_ip).await;
        self.finish(outcome)
    }

    async fn run_check(
        &self,
        check: ValidationCheck,
        validation: &mut Validation,
    ) -> Result<(), PingbackOutcome> {
        match check {
            ValidationCheck::TargetExists => {
                let exists = self
                    .repository
                    .target_exists(&validation.target)
                    .await
                    .map_err(storage_failure)?;
                if !exists {
                    return Err(PingbackOutcome::Error32TargetUriNotExist);
                }
            }
            ValidationCheck::NotYetRegistered => {
                let exists = self
                    .repository
                    .pingback_exists(&validation.source, &validation.target)
                    .await
                    .map_err(storage_failure)?;
                if exists {
                    return Err(PingbackOutcome::Error48PingbackAlreadyRegistered);
                }
            }
            ValidationCheck::SourceLinksToTarget => {
                let inspection = self
                    .inspector
                    .inspect(&validation.source, &validation.target, self.timeout)
                    .await
                    .map_err(|e| {
                        tracing::info!("Source inspection failed: {}", e);
                        PingbackOutcome::Error17SourceNotContainTargetUri
                    })?;
                if !inspection.contains_target_link {
                    return Err(PingbackOutcome::Error17SourceNotContainTargetUri);
                }
                validation.inspection = Some(inspection);
            }
            ValidationCheck::NotSpam => {
                let title = validation
                    .inspection
                    .as_ref()
                    .and_then(|i| i.title.clone());

                if title.as_deref().is_some_and(html::contains_markup) {
                    return Err(PingbackOutcome::SpamDetectedFakeNotFound);
                }

                let mut texts = vec![validation.source.to_string()];
                texts.extend(title);
                if self.moderator.is_spam(&texts).await {
                    return Err(PingbackOutcome::SpamDetectedFakeNotFound);
                }
            }
        }
        Ok(())
    }

    async fn commit(&self, validation: Validation, source_ip: Option<IpAddr>) -> PingbackOutcome {
        let inspection = validation.inspection.unwrap_or(InspectionResult {
            is_html: true,
            contains_target_link: true,
            title: None,
        });
        let request = PingRequest::new(
            validation.source,
            validation.target,
            inspection.title,
            inspection.is_html,
            inspection.contains_target_link,
        );

        match self
            .repository
            .save_pingback(NewPingback::from_request(&request, source_ip))
            .await
        {
            Ok(pingback) => {
                tracing::info!(
                    id = pingback.id,
                    source = %pingback.source_url,
                    target_url = %pingback.target_url,
                    "Pingback accepted"
                );
                self.publish_event(PingbackEvent::from(&pingback));
                PingbackOutcome::Success
            }
            Err(AppError::Conflict { .. }) => PingbackOutcome::Error48PingbackAlreadyRegistered,
            Err(e) => storage_failure(e),
        }
    }

    fn publish_event(&self, event: PingbackEvent) {
        let Some(events) = &self.events else {
            return;
        };

        match events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(ev)) => {
                tracing::warn!(pingback_id = ev.pingback_id, "Pingback event queue full, event dropped");
            }
            Err(TrySendError::Closed(ev)) => {
                tracing::warn!(pingback_id = ev.pingback_id, "Pingback event queue closed, event dropped");
            }
        }
    }

    fn finish(&self, outcome: PingbackOutcome) -> PingbackOutcome {
        metrics::counter!("pingback_inbound_total", "outcome" => outcome.as_str()).increment(1);
        outcome
    }
}

/// Parses both URIs. `None` if either is invalid or both name the same page.
fn parse_pair(source: &str, target: &str) -> Option<Validation> {
    let source = parse_absolute_url(source).ok()?;
    let target = parse_absolute_url(target).ok()?;
    if same_resource(&source, &target) {
        return None;
    }

    Some(Validation {
        source,
        target,
        inspection: None,
    })
}

fn storage_failure(e: AppError) -> PingbackOutcome {
    tracing::error!("Pingback storage error: {}", e);
    PingbackOutcome::GenericError
}
