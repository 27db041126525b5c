//! Handler for the post-published hook.

use axum::{Json, extract::State};
use serde_json::json;
use validator::Validate;

use crate::api::dto::publish::{NotifyResultItem, NotifySummary, PublishRequest, PublishResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_normalizer::parse_absolute_url;

/// Registers a published post and pings every page it links to.
///
/// # Endpoint
///
/// `POST /api/posts/published`
///
/// # Processing
///
/// 1. The post URL becomes a valid pingback target
/// 2. Outbound links are extracted from `content`
/// 3. Each linked page is notified concurrently; one failure never affects
///    the others
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://blog.example/2024/hello",
///   "content": "<p>See <a href=\"https://other.example/post\">this</a></p>"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "url": "https://blog.example/2024/hello",
///   "newly_published": true,
///   "summary": { "total": 1, "sent": 1, "skipped": 0, "failed": 0 },
///   "items": [
///     {
///       "target": "https://other.example/post",
///       "endpoint": "https://other.example/xmlrpc.php",
///       "sent": true,
///       "response_status": 200
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the URL is not an absolute HTTP(S) URL.
pub async fn publish_handler(
    State(state): State<AppState>,
    Json(payload): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, AppError> {
    payload.validate()?;

    let post_url = parse_absolute_url(&payload.url)
        .map_err(|e| AppError::bad_request(e.to_string(), json!({"url": payload.url})))?;

    let newly_published = state.repository.publish_target(&post_url).await?;

    let targets = state.link_extractor.extract(&post_url, &payload.content);
    tracing::info!(
        post = %post_url,
        newly_published,
        targets = targets.len(),
        "Post published, sending pingbacks"
    );

    let outcomes = state.sender.notify_all(&post_url, &targets).await;
    let summary = NotifySummary::from_outcomes(&outcomes);

    Ok(Json(PublishResponse {
        url: post_url.into(),
        newly_published,
        summary,
        items: outcomes.into_iter().map(NotifyResultItem::from).collect(),
    }))
}
