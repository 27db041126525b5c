//! Handlers for received pingback management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::api::dto::pingbacks::{ClearPingbacksResponse, PingbackItem, PingbackListResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists received pingbacks, newest first.
///
/// # Endpoint
///
/// `GET /api/pingbacks`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, range: 10..=1000)
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn pingback_list_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PingbackListResponse>, AppError> {
    let (offset, limit) = params
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (pingbacks, total_items) = tokio::try_join!(
        state.repository.list(offset, limit),
        state.repository.count()
    )?;

    Ok(Json(PingbackListResponse {
        pagination: PaginationMeta::new(params.page(), params.page_size(), total_items),
        items: pingbacks.into_iter().map(PingbackItem::from).collect(),
    }))
}

/// Deletes one pingback, allowing the same source to ping the target again.
///
/// # Endpoint
///
/// `DELETE /api/pingbacks/{id}`
///
/// # Errors
///
/// Returns 404 if the pingback does not exist.
pub async fn delete_pingback_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.repository.delete(id).await?;
    tracing::info!(pingback_id = id, "Pingback deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes every stored pingback.
///
/// # Endpoint
///
/// `DELETE /api/pingbacks`
pub async fn clear_pingbacks_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearPingbacksResponse>, AppError> {
    let deleted = state.repository.clear().await?;
    tracing::info!(deleted, "Pingbacks cleared");
    Ok(Json(ClearPingbacksResponse { deleted }))
}
