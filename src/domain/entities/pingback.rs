//! Accepted pingback record.

use chrono::{DateTime, Utc};
use std::net::IpAddr;
use url::Url;

use super::PingRequest;

/// A pingback that passed validation and was stored.
///
/// `(source_url, target_url)` is unique across all stored pingbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pingback {
    pub id: i64,
    pub source_url: Url,
    pub source_title: Option<String>,
    pub source_domain: String,
    pub target_url: Url,
    pub source_ip: Option<IpAddr>,
    pub received_at: DateTime<Utc>,
}

/// Input data for storing a pingback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPingback {
    pub source_url: Url,
    pub source_title: Option<String>,
    pub source_domain: String,
    pub target_url: Url,
    pub source_ip: Option<IpAddr>,
}

impl NewPingback {
    /// Derives the stored record from a validated ping.
    pub fn from_request(request: &PingRequest, source_ip: Option<IpAddr>) -> Self {
        Self {
            source_url: request.source_url.clone(),
            source_title: request.title.clone(),
            source_domain: request.source_domain().to_string(),
            target_url: request.target_url.clone(),
            source_ip,
        }
    }
}
