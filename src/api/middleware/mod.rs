//! HTTP middleware for request processing and protection.
//!
//! Provides authentication, rate limiting, endpoint advertisement and
//! observability middleware.

pub mod auth;
pub mod pingback_header;
pub mod rate_limit;
pub mod tracing;
