use tokio::sync::mpsc;

use crate::domain::pingback_event::PingbackEvent;

/// Drains accepted-pingback events until every sender is dropped.
///
/// Each event is logged and counted in `pingback_notifications_total`.
/// Returns the number of events handled.
pub async fn run_pingback_worker(mut rx: mpsc::Receiver<PingbackEvent>) -> u64 {
    let mut handled = 0;

    while let Some(ev) = rx.recv().await {
        tracing::info!(
            pingback_id = ev.pingback_id,
            source = %ev.source_url,
            target_url = %ev.target_url,
            title = ev.source_title.as_deref().unwrap_or(""),
            ip = ev.source_ip.as_deref().unwrap_or("unknown"),
            received_at = %ev.received_at,
            "New pingback received"
        );
        metrics::counter!("pingback_notifications_total").increment(1);
        handled += 1;
    }

    tracing::info!("Pingback worker stopped after {} events", handled);
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(id: i64) -> PingbackEvent {
        PingbackEvent {
            pingback_id: id,
            source_url: "https://source.example/a".to_string(),
            source_title: Some("Title".to_string()),
            target_url: "https://blog.example/b".to_string(),
            source_ip: None,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_worker_drains_until_closed() {
        let (tx, rx) = mpsc::channel(10);
        let worker = tokio::spawn(run_pingback_worker(rx));

        tx.send(event(1)).await.unwrap();
        tx.send(event(2)).await.unwrap();
        drop(tx);

        assert_eq!(worker.await.unwrap(), 2);
    }
}
