//! Accepted-pingback event model for asynchronous notification.

use chrono::{DateTime, Utc};

use crate::domain::entities::Pingback;

/// Notification that a pingback was accepted.
///
/// Sent by the receiver to a bounded channel after the record is stored and
/// consumed by [`crate::domain::pingback_worker::run_pingback_worker`]. The
/// HTTP response never waits on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingbackEvent {
    pub pingback_id: i64,
    pub source_url: String,
    pub source_title: Option<String>,
    pub target_url: String,
    pub source_ip: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl From<&Pingback> for PingbackEvent {
    fn from(pingback: &Pingback) -> Self {
        Self {
            pingback_id: pingback.id,
            source_url: pingback.source_url.to_string(),
            source_title: pingback.source_title.clone(),
            target_url: pingback.target_url.to_string(),
            source_ip: pingback.source_ip.map(|ip| ip.to_string()),
            received_at: pingback.received_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_event_from_pingback() {
        let pingback = Pingback {
            id: 7,
            source_url: Url::parse("https://source.example/a").unwrap(),
            source_title: None,
            source_domain: "source.example".to_string(),
            target_url: Url::parse("https://blog.example/b").unwrap(),
            source_ip: Some("198.51.100.4".parse().unwrap()),
            received_at: Utc::now(),
        };

        let event = PingbackEvent::from(&pingback);

        assert_eq!(event.pingback_id, 7);
        assert_eq!(event.source_url, "https://source.example/a");
        assert_eq!(event.target_url, "https://blog.example/b");
        assert_eq!(event.source_ip.as_deref(), Some("198.51.100.4"));
        assert!(event.source_title.is_none());
    }
}
