//! Pingback endpoint advertisement.

use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::infrastructure::remote::resolver::X_PINGBACK;

/// Adds `X-Pingback: <endpoint>` to every response that does not set it.
///
/// Lets other blogs discover the XML-RPC endpoint from any page served
/// by this service without parsing HTML.
pub fn layer(endpoint: HeaderValue) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(HeaderName::from_static(X_PINGBACK), endpoint)
}
