//! Delivery of encoded `pingback.ping` calls.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::client::{MAX_RESPONSE_BYTES, read_body_capped};
use crate::protocol::xmlrpc::{self, MethodResponse};

/// Result of a completed POST to a pingback endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    /// Decoded XML-RPC answer, `None` when the body was not a method response.
    pub response: Option<MethodResponse>,
}

impl DeliveryReceipt {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fault code of the remote answer, if it was a fault.
    pub fn fault_code(&self) -> Option<i32> {
        match &self.response {
            Some(MethodResponse::Fault { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("POST to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },
}

/// Sends XML-RPC documents to remote endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PingTransport: Send + Sync {
    /// POSTs `body` as `text/xml`. No retries.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if no HTTP response was received
    /// (connection failure or timeout). Non-2xx answers are receipts.
    async fn post_xml(
        &self,
        endpoint: &Url,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<DeliveryReceipt, TransportError>;
}

pub struct HttpPingTransport {
    client: Client,
}

impl HttpPingTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PingTransport for HttpPingTransport {
    async fn post_xml(
        &self,
        endpoint: &Url,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<DeliveryReceipt, TransportError> {
        let failed = |reason: String| TransportError::Request {
            endpoint: endpoint.to_string(),
            reason,
        };

        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "text/xml")
            .timeout(timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status().as_u16();
        let response = match read_body_capped(response, MAX_RESPONSE_BYTES).await {
            Ok(bytes) => xmlrpc::decode_method_response(&bytes).ok(),
            Err(e) => {
                tracing::debug!(endpoint = %endpoint, "Failed to read endpoint response: {}", e);
                None
            }
        };

        Ok(DeliveryReceipt { status, response })
    }
}
