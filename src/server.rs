//! HTTP server initialization and runtime setup.
//!
//! Builds the remote adapters and services, seeds published targets, spawns
//! the accepted-pingback worker and runs the Axum server until Ctrl-C.

use crate::application::services::{AuthService, PingbackReceiver, PingbackSender};
use crate::config::Config;
use crate::domain::pingback_worker::run_pingback_worker;
use crate::domain::repositories::PingbackRepository;
use crate::infrastructure::content::HtmlLinkExtractor;
use crate::infrastructure::moderation::{ContentModerator, HttpModerator, NullModerator};
use crate::infrastructure::persistence::MemoryPingbackRepository;
use crate::infrastructure::remote::{
    HttpPingTransport, HttpSourceInspector, HttpTargetResolver, build_http_client,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Shared outbound HTTP client
/// - In-memory store seeded from `PUBLISHED_URLS_FILE`
/// - Content moderator (remote or disabled)
/// - Background accepted-pingback worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The published URLs file cannot be read
/// - The HTTP client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let timeout = config.pingback_timeout();

    let client = build_http_client(&config.user_agent).context("Failed to build HTTP client")?;

    let published = config.load_published_urls()?;
    let repository: Arc<dyn PingbackRepository> =
        Arc::new(MemoryPingbackRepository::with_targets(&published));
    tracing::info!("Store ready with {} published targets", published.len());

    let moderator: Arc<dyn ContentModerator> = match &config.moderator_endpoint {
        Some(endpoint) => {
            tracing::info!("Moderation enabled ({})", config.moderator_provider);
            Arc::new(HttpModerator::new(
                client.clone(),
                endpoint,
                &config.moderator_provider,
                config.moderator_api_key.clone(),
                timeout,
            ))
        }
        None => {
            tracing::info!("Moderation disabled (NullModerator)");
            Arc::new(NullModerator::new())
        }
    };

    let (event_tx, event_rx) = mpsc::channel(config.event_queue_capacity);
    let worker = tokio::spawn(run_pingback_worker(event_rx));
    tracing::info!("Pingback worker started");

    let receiver = PingbackReceiver::new(
        repository.clone(),
        Arc::new(HttpSourceInspector::new(client.clone())),
        moderator.clone(),
        timeout,
    )
    .with_events(event_tx.clone());

    let sender = PingbackSender::new(
        Arc::new(HttpTargetResolver::new(client.clone())),
        Arc::new(HttpPingTransport::new(client)),
        timeout,
        config.send_concurrency,
    );

    let pingback_endpoint = HeaderValue::from_str(&config.pingback_endpoint())
        .context("SITE_URL cannot be used in the X-Pingback header")?;

    let state = AppState {
        receiver: Arc::new(receiver),
        sender: Arc::new(sender),
        repository,
        link_extractor: Arc::new(HtmlLinkExtractor),
        moderator,
        auth_service: Arc::new(AuthService::new(config.admin_token.as_deref())),
        event_sender: event_tx,
        pingback_endpoint,
        behind_proxy: config.behind_proxy,
    };

    if !state.auth_service.is_enabled() {
        tracing::warn!("ADMIN_TOKEN is not set; the admin API rejects every request");
    }

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the remaining senders; once it is gone the worker drains and stops.
    match worker.await {
        Ok(handled) => tracing::info!("Shutdown complete, {} pingback events handled", handled),
        Err(e) => tracing::warn!("Pingback worker ended abnormally: {}", e),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
