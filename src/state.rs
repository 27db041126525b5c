//! Shared application state injected into all handlers.

use axum::http::HeaderValue;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, PingbackReceiver, PingbackSender};
use crate::domain::pingback_event::PingbackEvent;
use crate::domain::repositories::PingbackRepository;
use crate::infrastructure::content::LinkExtractor;
use crate::infrastructure::moderation::ContentModerator;

/// Services and settings shared by every request.
///
/// Cloned per request; all members are reference-counted or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub receiver: Arc<PingbackReceiver>,
    pub sender: Arc<PingbackSender>,
    pub repository: Arc<dyn PingbackRepository>,
    pub link_extractor: Arc<dyn LinkExtractor>,
    pub moderator: Arc<dyn ContentModerator>,
    pub auth_service: Arc<AuthService>,
    /// Producer side of the accepted-pingback queue, kept for health checks.
    pub event_sender: mpsc::Sender<PingbackEvent>,
    /// Value of the `X-Pingback` header added to every response.
    pub pingback_endpoint: HeaderValue,
    pub behind_proxy: bool,
}
