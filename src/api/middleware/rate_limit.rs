//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

type PeerLayer = GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;
type ProxiedLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Per-IP limiter keyed on either the peer address or proxy headers.
pub enum RateLimit {
    Peer(PeerLayer),
    Proxied(ProxiedLayer),
}

/// Creates the rate limiter for the XML-RPC endpoint.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 30 requests
///
/// Every accepted request may trigger an outbound fetch of the source page,
/// so the burst stays small. Requests exceeding the limit receive
/// `429 Too Many Requests`.
///
/// # Key Extraction
///
/// With `behind_proxy` the client IP is read from `X-Forwarded-For`,
/// `X-Real-IP` or `Forwarded`; otherwise from the socket peer address.
///
/// # Example
///
/// ```rust,ignore
/// let router = Router::new().route("/pingback", post(pingback_handler));
/// let router = rate_limit::layer(false).apply(router);
/// ```
pub fn layer(behind_proxy: bool) -> RateLimit {
    build(2, 30, behind_proxy)
}

/// Creates a stricter rate limiter for authenticated endpoints.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
///
/// Used for the admin API, where publishing a post fans out to every linked
/// site.
pub fn secure_layer(behind_proxy: bool) -> RateLimit {
    build(1, 10, behind_proxy)
}

fn build(per_second: u64, burst_size: u32, behind_proxy: bool) -> RateLimit {
    if behind_proxy {
        let config = GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("rate limit period and burst size are non-zero");
        RateLimit::Proxied(GovernorLayer::new(Arc::new(config)))
    } else {
        let config = GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .finish()
            .expect("rate limit period and burst size are non-zero");
        RateLimit::Peer(GovernorLayer::new(Arc::new(config)))
    }
}

impl RateLimit {
    /// Applies the limiter to `router`.
    pub fn apply<S>(self, router: axum::Router<S>) -> axum::Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match self {
            RateLimit::Peer(layer) => router.layer(layer),
            RateLimit::Proxied(layer) => router.layer(layer),
        }
    }
}
