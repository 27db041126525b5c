//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations. Implementations live in
//! `crate::infrastructure::persistence`, and mock implementations are
//! generated via `mockall` for testing.

pub mod pingback_repository;

pub use pingback_repository::PingbackRepository;

#[cfg(test)]
pub use pingback_repository::MockPingbackRepository;
