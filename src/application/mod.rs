//! Application layer services implementing business logic.
//!
//! Services coordinate repositories and remote adapters through traits and
//! provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::pingback_receiver::PingbackReceiver`] - Inbound `pingback.ping` validation
//! - [`services::pingback_sender::PingbackSender`] - Outbound notification fan-out
//! - [`services::auth_service::AuthService`] - Admin API token authentication

pub mod services;
