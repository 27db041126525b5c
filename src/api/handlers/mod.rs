//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod pingbacks;
pub mod publish;
pub mod xmlrpc;

pub use health::health_handler;
pub use pingbacks::{clear_pingbacks_handler, delete_pingback_handler, pingback_list_handler};
pub use publish::publish_handler;
pub use xmlrpc::pingback_handler;
