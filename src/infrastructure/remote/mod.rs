//! HTTP adapters for talking to remote blogs.
//!
//! - [`inspector`] - fetches inbound pingback sources
//! - [`resolver`] - discovers outbound pingback endpoints
//! - [`transport`] - POSTs XML-RPC calls

pub mod client;
pub mod inspector;
pub mod resolver;
pub mod transport;

pub use client::build_http_client;
pub use inspector::{HttpSourceInspector, InspectError, InspectionResult, SourceInspector};
pub use resolver::{HttpTargetResolver, ResolveError, TargetResolver};
pub use transport::{DeliveryReceipt, HttpPingTransport, PingTransport, TransportError};

#[cfg(test)]
pub use inspector::MockSourceInspector;
#[cfg(test)]
pub use resolver::MockTargetResolver;
#[cfg(test)]
pub use transport::MockPingTransport;
