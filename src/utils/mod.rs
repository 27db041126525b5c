//! Utility functions for URL processing and request handling.
//!
//! - [`url_normalizer`] - Absolute URL validation and comparison keys
//! - [`client_ip`] - Client address extraction, proxy-aware

pub mod client_ip;
pub mod url_normalizer;
