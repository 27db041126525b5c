//! Wire formats spoken by the pingback service.
//!
//! - [`xml`] - Minimal well-formedness-checking XML reader and escaping
//! - [`xmlrpc`] - `methodCall` / `methodResponse` codec for `pingback.ping`
//! - [`html`] - Regex-based HTML scanning for titles, anchors and `<link>` tags

pub mod html;
pub mod xml;
pub mod xmlrpc;
