//! Shared reqwest client for calls to remote blogs.

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};

/// Largest page body read while inspecting sources or discovering endpoints.
pub const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// Largest XML-RPC response body read from a remote endpoint.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

const MAX_REDIRECTS: usize = 5;

/// Builds the HTTP client used for every outbound pingback call.
///
/// Requests carry `Accept-Language: en-us` and the given User-Agent. At most
/// five redirects are followed. Timeouts are set per request by callers.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(user_agent: &str) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-us"));

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
}

/// Reads at most `limit` bytes of a response body.
///
/// Anything past the limit is discarded without being downloaded.
pub async fn read_body_capped(mut response: Response, limit: usize) -> reqwest::Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = limit - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Returns the response `Content-Type` header, if it is valid text.
pub fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
