//! # Blog Pingback
//!
//! Pingback XML-RPC endpoint and outbound pingback notifier for blog engines,
//! built with Axum.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Pingback entities, outcomes and repository traits
//! - **Application Layer** ([`application`]) - Inbound validation and outbound notification
//! - **Infrastructure Layer** ([`infrastructure`]) - Remote HTTP adapters, moderation, storage
//! - **Protocol Layer** ([`protocol`]) - XML-RPC codec and HTML scanning
//! - **API Layer** ([`api`]) - XML-RPC endpoint, admin REST API, middleware
//!
//! ## Features
//!
//! - `pingback.ping` with the standard fault codes (0, 17, 32, 48)
//! - Endpoint discovery through `X-Pingback` or `<link rel="pingback">`
//! - Concurrent outbound notification with per-target outcomes
//! - Optional remote spam moderation (fails open)
//! - Bearer token admin API, rate limiting and structured logging
//!
//! ## Quick Start
//!
//! ```bash
//! export SITE_URL="https://blog.example"
//! export PUBLISHED_URLS_FILE="published.txt"
//! export ADMIN_TOKEN="$(cargo run --bin admin -- token generate)"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod protocol;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AuthService, PingbackReceiver, PingbackSendOutcome, PingbackSender,
    };
    pub use crate::domain::entities::{NewPingback, PingRequest, Pingback};
    pub use crate::domain::outcome::PingbackOutcome;
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
