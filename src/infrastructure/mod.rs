//! Infrastructure layer implementing external integrations.
//!
//! - [`remote`] - HTTP adapters for remote blogs (inspection, discovery, delivery)
//! - [`moderation`] - Spam moderation backends
//! - [`content`] - Outbound link extraction from post bodies
//! - [`persistence`] - Repository implementations

pub mod content;
pub mod moderation;
pub mod persistence;
pub mod remote;
