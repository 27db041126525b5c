//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /pingback`    - XML-RPC `pingback.ping` endpoint (public)
//! - `GET  /health`      - Health check: store, event queue, moderator (public)
//! - `/api/*`            - Admin API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **X-Pingback** - Endpoint advertisement on every response
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token for the admin API
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, pingback_handler};
use crate::api::middleware::{auth, pingback_header, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// When `state.behind_proxy` is set, rate limiting reads the client IP from
/// `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket
/// address; enable only when the service runs behind a trusted reverse proxy.
///
/// The returned service needs `ConnectInfo<SocketAddr>`; serve it with
/// `into_make_service_with_connect_info`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let behind_proxy = state.behind_proxy;
    let endpoint = state.pingback_endpoint.clone();

    let api_router = rate_limit::secure_layer(behind_proxy).apply(
        api::routes::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer)),
    );

    let xmlrpc_router = rate_limit::layer(behind_proxy).apply(
        Router::new().route("/pingback", post(pingback_handler)),
    );

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(xmlrpc_router)
        .nest("/api", api_router)
        .with_state(state)
        .layer(pingback_header::layer(endpoint))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
