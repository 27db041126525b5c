//! Handler for the XML-RPC pingback endpoint.

use axum::{
    body::{Body, to_bytes},
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::domain::outcome::PingbackOutcome;
use crate::protocol::xmlrpc::{decode_method_call, encode_response};
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Largest accepted XML-RPC request body.
pub const MAX_XMLRPC_BODY_BYTES: usize = 64 * 1024;

/// Receives `pingback.ping` calls.
///
/// # Endpoint
///
/// `POST /pingback`
///
/// # Request Body
///
/// ```xml
/// <?xml version="1.0"?>
/// <methodCall>
///   <methodName>pingback.ping</methodName>
///   <params>
///     <param><value><string>https://other.example/post</string></value></param>
///     <param><value><string>https://blog.example/my-post</string></value></param>
///   </params>
/// </methodCall>
/// ```
///
/// # Response Codes
///
/// - **200 OK**: Always for XML requests; the body is a success or fault
///   `methodResponse`
/// - **415 Unsupported Media Type**: `Content-Type` is present and not XML
///
/// A body that is not a well-formed method call, or is larger than
/// [`MAX_XMLRPC_BODY_BYTES`], yields fault 0 with a generic message. Parser
/// details are only logged.
pub async fn pingback_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if !is_xml_request(&headers) {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "XML-RPC requests must be sent as text/xml",
        )
            .into_response();
    }

    let ip = client_ip(&headers, peer, state.behind_proxy);

    let body = match to_bytes(body, MAX_XMLRPC_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            tracing::info!(error = %e, client_ip = %ip, "Unreadable XML-RPC request body");
            metrics::counter!("pingback_inbound_total", "outcome" => "malformed").increment(1);
            return xml_response(encode_response(&PingbackOutcome::GenericError.to_response()));
        }
    };

    let response = match decode_method_call(&body) {
        Ok(call) => state.receiver.handle_call(&call, Some(ip)).await.to_response(),
        Err(e) => {
            tracing::info!(error = %e, client_ip = %ip, "Malformed XML-RPC request");
            metrics::counter!("pingback_inbound_total", "outcome" => "malformed").increment(1);
            PingbackOutcome::GenericError.to_response()
        }
    };

    xml_response(encode_response(&response))
}

fn xml_response(body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

/// Accepts `text/xml`, `application/xml` and `+xml` types. A missing header
/// is tolerated; some clients omit it.
fn is_xml_request(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };

    let Ok(value) = value.to_str() else {
        return false;
    };

    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "text/xml" || mime == "application/xml" || mime.ends_with("+xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::xmlrpc;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn test_xml_content_types() {
        assert!(is_xml_request(&headers("text/xml")));
        assert!(is_xml_request(&headers("Text/XML; charset=UTF-8")));
        assert!(is_xml_request(&headers("application/xml")));
        assert!(is_xml_request(&headers("application/rss+xml")));
        assert!(is_xml_request(&HeaderMap::new()));
    }

    #[test]
    fn test_non_xml_content_types() {
        assert!(!is_xml_request(&headers("application/json")));
        assert!(!is_xml_request(&headers("text/plain")));
        assert!(!is_xml_request(&headers("application/x-www-form-urlencoded")));
    }

    #[test]
    fn test_malformed_body_fault_is_generic() {
        let body = encode_response(&PingbackOutcome::GenericError.to_response());
        let decoded = xmlrpc::decode_method_response(&body).unwrap();

        assert_eq!(
            decoded,
            xmlrpc::MethodResponse::Fault {
                code: 0,
                message: crate::domain::outcome::GENERIC_FAULT_MESSAGE.to_string(),
            }
        );
    }
}
