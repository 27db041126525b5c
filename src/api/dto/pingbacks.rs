//! DTOs for received pingback management.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::dto::pagination::PaginationMeta;
use crate::domain::entities::Pingback;

/// Paginated list of received pingbacks, newest first.
#[derive(Debug, Serialize)]
pub struct PingbackListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<PingbackItem>,
}

/// A stored pingback.
#[derive(Debug, Serialize)]
pub struct PingbackItem {
    pub id: i64,
    pub source_url: String,
    pub source_title: Option<String>,
    pub source_domain: String,
    pub target_url: String,
    pub source_ip: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl From<Pingback> for PingbackItem {
    fn from(p: Pingback) -> Self {
        Self {
            id: p.id,
            source_url: p.source_url.into(),
            source_title: p.source_title,
            source_domain: p.source_domain,
            target_url: p.target_url.into(),
            source_ip: p.source_ip.map(|ip| ip.to_string()),
            received_at: p.received_at,
        }
    }
}

/// Result of clearing all stored pingbacks.
#[derive(Debug, Serialize)]
pub struct ClearPingbacksResponse {
    pub deleted: u64,
}
