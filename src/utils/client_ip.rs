//! Client IP extraction for inbound pingbacks.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Returns the IP address a request came from.
///
/// When `behind_proxy` is true, the first entry of `X-Forwarded-For` is used,
/// then `X-Real-IP`. Header values that do not parse as an IP address are
/// ignored. Without a usable header the socket peer address is returned.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let ip = client_ip(&headers, peer, true);
/// assert_eq!(ip.to_string(), "203.0.113.7");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> IpAddr {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse().ok());

        if let Some(ip) = forwarded {
            return ip;
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        if let Some(ip) = real_ip {
            return ip;
        }
    }

    peer.ip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "192.0.2.10:51234".parse().unwrap()
    }

    #[test]
    fn test_peer_address_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));

        let ip = client_ip(&headers, peer(), false);
        assert_eq!(ip.to_string(), "192.0.2.10");
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        let ip = client_ip(&headers, peer(), true);
        assert_eq!(ip.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        headers.insert("x-real-ip", HeaderValue::from_static("2001:db8::1"));

        let ip = client_ip(&headers, peer(), true);
        assert_eq!(ip.to_string(), "2001:db8::1");
    }

    #[test]
    fn test_proxy_without_headers_uses_peer() {
        let ip = client_ip(&HeaderMap::new(), peer(), true);
        assert_eq!(ip.to_string(), "192.0.2.10");
    }
}
