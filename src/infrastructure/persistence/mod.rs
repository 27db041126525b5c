//! Repository implementations.
//!
//! Implements the repository traits defined in [`crate::domain::repositories`].
//! The service ships a volatile in-memory store; durable backends plug in
//! through the same [`crate::domain::repositories::PingbackRepository`] trait.

mod memory_pingback_repository;

pub use memory_pingback_repository::MemoryPingbackRepository;
