//! Outbound pingback notification.

use futures::StreamExt;
use futures::stream;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::infrastructure::remote::{PingTransport, TargetResolver};
use crate::protocol::xmlrpc::{self, PINGBACK_METHOD};
use crate::utils::url_normalizer::{comparison_key, same_resource};

/// Why an outbound pingback was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    /// The target page could not be fetched.
    TargetUnreachable,
    /// The endpoint could not be reached or answered with a non-2xx status.
    DeliveryFailed,
}

impl SendErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TargetUnreachable => "target_unreachable",
            Self::DeliveryFailed => "delivery_failed",
        }
    }
}

/// Result of notifying one target.
///
/// `sent=false` with no error means the target does not accept pingbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingbackSendOutcome {
    pub target: String,
    pub endpoint: Option<String>,
    pub sent: bool,
    pub response_status: Option<u16>,
    pub error: Option<SendErrorKind>,
    /// Fault returned by an endpoint that answered 2xx with a fault document.
    pub fault_code: Option<i32>,
}

impl PingbackSendOutcome {
    fn new(target: &Url) -> Self {
        Self {
            target: target.to_string(),
            endpoint: None,
            sent: false,
            response_status: None,
            error: None,
            fault_code: None,
        }
    }

    fn result_label(&self) -> &'static str {
        match (self.sent, self.error) {
            (true, _) => "sent",
            (false, Some(kind)) => kind.as_str(),
            (false, None) => "no_endpoint",
        }
    }
}

/// Sends `pingback.ping` calls for a published post.
///
/// Every target gets at most one delivery attempt per call. Failures are
/// reported in the returned outcomes and never abort a batch.
pub struct PingbackSender {
    resolver: Arc<dyn TargetResolver>,
    transport: Arc<dyn PingTransport>,
    timeout: Duration,
    concurrency: usize,
}

impl PingbackSender {
    /// Creates a sender.
    ///
    /// # Arguments
    ///
    /// - `timeout` - limit for each discovery and each delivery request
    /// - `concurrency` - maximum number of targets notified at once
    pub fn new(
        resolver: Arc<dyn TargetResolver>,
        transport: Arc<dyn PingTransport>,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            transport,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Notifies one target that `source` links to it.
    pub async fn notify(&self, source: &Url, target: &Url) -> PingbackSendOutcome {
        let outcome = self.deliver(source, target).await;

        metrics::counter!("pingback_outbound_total", "result" => outcome.result_label())
            .increment(1);
        tracing::info!(
            source = %source,
            target_url = %target,
            result = outcome.result_label(),
            status = ?outcome.response_status,
            fault_code = ?outcome.fault_code,
            "Pingback notification finished"
        );

        outcome
    }

    async fn deliver(&self, source: &Url, target: &Url) -> PingbackSendOutcome {
        let mut outcome = PingbackSendOutcome::new(target);

        let endpoint = match self.resolver.resolve_endpoint(target, self.timeout).await {
            Ok(Some(endpoint)) => endpoint,
            Ok(None) => return outcome,
            Err(e) => {
                tracing::debug!("Endpoint discovery failed: {}", e);
                outcome.error = Some(SendErrorKind::TargetUnreachable);
                return outcome;
            }
        };
        outcome.endpoint = Some(endpoint.to_string());

        let params = [source.as_str(), target.as_str()];
        let body = xmlrpc::encode_method_call(PINGBACK_METHOD, &params[..]);
        match self.transport.post_xml(&endpoint, body, self.timeout).await {
            Ok(receipt) => {
                outcome.response_status = Some(receipt.status);
                if receipt.is_success() {
                    outcome.sent = true;
                    outcome.fault_code = receipt.fault_code();
                } else {
                    outcome.error = Some(SendErrorKind::DeliveryFailed);
                }
            }
            Err(e) => {
                tracing::debug!("Pingback delivery failed: {}", e);
                outcome.error = Some(SendErrorKind::DeliveryFailed);
            }
        }

        outcome
    }

    /// Notifies every target that `source` links to it.
    ///
    /// Targets are deduplicated and links back to `source` are skipped. Up
    /// to `concurrency` targets are processed at once, and a free slot goes
    /// to the next target as soon as any delivery finishes. Results come
    /// back in input order.
    pub async fn notify_all(&self, source: &Url, targets: &[Url]) -> Vec<PingbackSendOutcome> {
        let mut seen = HashSet::new();
        let unique: Vec<&Url> = targets
            .iter()
            .filter(|target| !same_resource(source, target))
            .filter(|target| seen.insert(comparison_key(target)))
            .collect();

        tracing::info!(
            source = %source,
            targets = unique.len(),
            "Sending pingbacks"
        );

        let deliveries: Vec<_> = unique
            .into_iter()
            .enumerate()
            .map(|(index, target)| async move { (index, self.notify(source, target).await) })
            .collect();

        let mut outcomes: Vec<(usize, PingbackSendOutcome)> = stream::iter(deliveries)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        outcomes.sort_unstable_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}
