//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core business data structures
//! - [`outcome`] - Terminal results of inbound validation
//! - [`repositories`] - Data access trait definitions
//! - [`pingback_event`] - Accepted-pingback event model
//! - [`pingback_worker`] - Background consumer of accepted-pingback events
//!
//! # Accepted Pingback Flow
//!
//! 1. The XML-RPC handler passes the call to the receiver
//! 2. The receiver stores the pingback through [`repositories::PingbackRepository`]
//! 3. A [`pingback_event::PingbackEvent`] is sent to the channel (non-blocking)
//! 4. [`pingback_worker::run_pingback_worker`] logs and counts it

pub mod entities;
pub mod outcome;
pub mod pingback_event;
pub mod pingback_worker;
pub mod repositories;
