//! Business logic services for the application layer.

pub mod auth_service;
pub mod pingback_receiver;
pub mod pingback_sender;

pub use auth_service::AuthService;
pub use pingback_receiver::{PingbackReceiver, VALIDATION_CHAIN, ValidationCheck};
pub use pingback_sender::{PingbackSendOutcome, PingbackSender, SendErrorKind};
