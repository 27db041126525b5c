mod common;

use blog_pingback::infrastructure::remote::{HttpSourceInspector, InspectError, SourceInspector};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "https://blog.example/2024/hello";

fn inspector() -> HttpSourceInspector {
    HttpSourceInspector::new(common::http_client())
}

async fn serve(remote: &MockServer, route: &str, template: ResponseTemplate) -> url::Url {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(remote)
        .await;
    common::url(&format!("{}{}", remote.uri(), route))
}

#[tokio::test]
async fn test_page_linking_to_target() {
    let remote = MockServer::start().await;
    let page = common::html_page(r#"<a href="https://BLOG.example:443/2024/hello/#comments">re</a>"#);
    let source = serve(
        &remote,
        "/reply",
        ResponseTemplate::new(200).set_body_raw(page, "text/html; charset=utf-8"),
    )
    .await;

    let result = inspector()
        .inspect(&source, &common::url(TARGET), Duration::from_secs(5))
        .await
        .unwrap();

    assert!(result.is_html);
    assert!(result.contains_target_link);
    assert_eq!(result.title.as_deref(), Some("Reply post"));
}

#[tokio::test]
async fn test_sends_accept_language() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept-language", "en-us"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(common::html_page(""), "text/html"))
        .expect(1)
        .mount(&remote)
        .await;

    let source = common::url(&format!("{}/any", remote.uri()));
    let result = inspector()
        .inspect(&source, &common::url(TARGET), Duration::from_secs(5))
        .await
        .unwrap();

    assert!(!result.contains_target_link);
}

#[tokio::test]
async fn test_plain_text_never_links() {
    let remote = MockServer::start().await;
    let source = serve(
        &remote,
        "/notes.txt",
        ResponseTemplate::new(200).set_body_raw(format!("see {}", TARGET), "text/plain"),
    )
    .await;

    let result = inspector()
        .inspect(&source, &common::url(TARGET), Duration::from_secs(5))
        .await
        .unwrap();

    assert!(!result.is_html);
    assert!(!result.contains_target_link);
    assert!(result.title.is_none());
}

#[tokio::test]
async fn test_error_status_is_unreachable() {
    let remote = MockServer::start().await;
    let source = serve(&remote, "/missing", ResponseTemplate::new(404)).await;

    let err = inspector()
        .inspect(&source, &common::url(TARGET), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, InspectError::SourceUnreachable { .. }));
}

#[tokio::test]
async fn test_timeout_is_unreachable() {
    let remote = MockServer::start().await;
    let source = serve(
        &remote,
        "/slow",
        ResponseTemplate::new(200)
            .set_body_raw(common::html_page(""), "text/html")
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let err = inspector()
        .inspect(&source, &common::url(TARGET), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(err, InspectError::SourceUnreachable { .. }));
}
