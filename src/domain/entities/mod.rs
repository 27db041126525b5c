//! Core domain entities of the pingback service.
//!
//! - [`PingRequest`] - An inbound ping after source inspection
//! - [`Pingback`] - A stored, accepted pingback
//!
//! Creation input for stored records uses a separate struct ([`NewPingback`]).

pub mod ping_request;
pub mod pingback;

pub use ping_request::PingRequest;
pub use pingback::{NewPingback, Pingback};
