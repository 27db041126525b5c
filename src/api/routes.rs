//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    clear_pingbacks_handler, delete_pingback_handler, pingback_list_handler, publish_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /pingbacks`        - Received pingbacks (paginated)
/// - `DELETE /pingbacks`        - Delete every received pingback
/// - `DELETE /pingbacks/{id}`   - Delete one pingback
/// - `POST   /posts/published`  - Register a post and ping the pages it links to
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pingbacks",
            get(pingback_list_handler).delete(clear_pingbacks_handler),
        )
        .route("/pingbacks/{id}", delete(delete_pingback_handler))
        .route("/posts/published", post(publish_handler))
}
