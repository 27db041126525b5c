mod common;

use axum::body::Bytes;
use axum::{Router, routing::post};
use axum_test::{TestResponse, TestServer};
use blog_pingback::api::handlers::pingback_handler;
use blog_pingback::api::handlers::xmlrpc::MAX_XMLRPC_BODY_BYTES;
use blog_pingback::api::middleware::pingback_header;
use blog_pingback::domain::outcome::GENERIC_FAULT_MESSAGE;
use blog_pingback::protocol::xmlrpc::{MethodResponse, decode_method_response};
use blog_pingback::state::AppState;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{MockConnectInfoLayer, PUBLISHED_POST};

fn test_server(state: AppState) -> TestServer {
    let endpoint = state.pingback_endpoint.clone();
    let app = Router::new()
        .route("/pingback", post(pingback_handler))
        .layer(MockConnectInfoLayer)
        .layer(pingback_header::layer(endpoint))
        .with_state(state);

    TestServer::new(app).unwrap()
}

async fn send_ping(server: &TestServer, source: &str, target: &str) -> TestResponse {
    server
        .post("/pingback")
        .bytes(Bytes::from(common::pingback_call(source, target)))
        .content_type("text/xml")
        .await
}

fn method_response(response: &TestResponse) -> MethodResponse {
    decode_method_response(response.text().as_bytes()).unwrap()
}

fn fault_code(response: &TestResponse) -> i32 {
    match method_response(response) {
        MethodResponse::Fault { code, .. } => code,
        other => panic!("expected fault, got {:?}", other),
    }
}

async fn source_page(body: &str) -> (MockServer, String) {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reply"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(common::html_page(body), "text/html"),
        )
        .mount(&remote)
        .await;

    let source = format!("{}/reply", remote.uri());
    (remote, source)
}

#[tokio::test]
async fn test_pingback_success() {
    let (state, mut rx) = common::create_test_state();
    let repository = state.repository.clone();
    let server = test_server(state);
    let (_remote, source) =
        source_page(&format!(r#"<p>Nice <a href="{}">post</a></p>"#, PUBLISHED_POST)).await;

    let response = send_ping(&server, &source, PUBLISHED_POST).await;

    response.assert_status_ok();
    assert!(response.header("content-type").to_str().unwrap().starts_with("text/xml"));
    assert_eq!(
        method_response(&response),
        MethodResponse::Success("Pingback successful.".to_string())
    );

    let stored = repository.list(0, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].source_title.as_deref(), Some("Reply post"));
    assert_eq!(stored[0].source_ip, Some("127.0.0.1".parse().unwrap()));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.pingback_id, stored[0].id);
    assert_eq!(event.target_url, PUBLISHED_POST);
}

#[tokio::test]
async fn test_second_ping_is_already_registered() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);
    let (_remote, source) =
        source_page(&format!(r#"<a href="{}">post</a>"#, PUBLISHED_POST)).await;

    send_ping(&server, &source, PUBLISHED_POST).await.assert_status_ok();
    let response = send_ping(&server, &source, PUBLISHED_POST).await;

    assert_eq!(fault_code(&response), 48);
}

#[tokio::test]
async fn test_unknown_target() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);
    let (_remote, source) =
        source_page(r#"<a href="https://blog.example/unpublished">post</a>"#).await;

    let response = send_ping(&server, &source, "https://blog.example/unpublished").await;

    response.assert_status_ok();
    assert_eq!(fault_code(&response), 32);
}

#[tokio::test]
async fn test_source_without_link() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);
    let (_remote, source) = source_page("<p>No links here</p>").await;

    let response = send_ping(&server, &source, PUBLISHED_POST).await;

    assert_eq!(fault_code(&response), 17);
}

#[tokio::test]
async fn test_unreachable_source() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&remote)
        .await;

    let response = send_ping(&server, &format!("{}/gone", remote.uri()), PUBLISHED_POST).await;

    assert_eq!(fault_code(&response), 17);
}

#[tokio::test]
async fn test_markup_in_title_is_reported_as_not_found() {
    let (state, _rx) = common::create_test_state();
    let repository = state.repository.clone();
    let server = test_server(state);

    let remote = MockServer::start().await;
    let page = format!(
        r#"<html><head><title>&lt;a href="https://spam.example"&gt;cheap&lt;/a&gt;</title></head><body><a href="{}">x</a></body></html>"#,
        PUBLISHED_POST
    );
    Mock::given(method("GET"))
        .and(path("/spam"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&remote)
        .await;

    let response = send_ping(&server, &format!("{}/spam", remote.uri()), PUBLISHED_POST).await;

    match method_response(&response) {
        MethodResponse::Fault { code, message } => {
            assert_eq!(code, 32);
            assert_eq!(message, "The specified target URI does not exist.");
        }
        other => panic!("expected fault, got {:?}", other),
    }
    assert_eq!(repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_same_source_and_target_is_invalid() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);

    let response = send_ping(&server, PUBLISHED_POST, "https://BLOG.example/2024/hello/").await;

    assert_eq!(fault_code(&response), 0);
}

#[tokio::test]
async fn test_malformed_body_yields_generic_fault() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);

    let response = server
        .post("/pingback")
        .bytes(Bytes::from_static(b"<methodCall><methodName>pingback.ping"))
        .content_type("text/xml")
        .await;

    response.assert_status_ok();
    assert_eq!(
        method_response(&response),
        MethodResponse::Fault {
            code: 0,
            message: GENERIC_FAULT_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn test_oversized_body_yields_generic_fault() {
    let (state, mut rx) = common::create_test_state();
    let server = test_server(state);

    let padding = "x".repeat(MAX_XMLRPC_BODY_BYTES + 1024);
    let mut body = common::pingback_call("https://a.example/reply", PUBLISHED_POST);
    body.extend_from_slice(format!("<!-- {} -->", padding).as_bytes());

    let response = server
        .post("/pingback")
        .bytes(Bytes::from(body))
        .content_type("text/xml")
        .await;

    response.assert_status_ok();
    assert!(
        response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/xml")
    );
    assert_eq!(
        method_response(&response),
        MethodResponse::Fault {
            code: 0,
            message: GENERIC_FAULT_MESSAGE.to_string(),
        }
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_unsupported_method() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);
    let params = ["a", "b"];
    let body = blog_pingback::protocol::xmlrpc::encode_method_call("system.listMethods", &params[..]);

    let response = server
        .post("/pingback")
        .bytes(Bytes::from(body))
        .content_type("text/xml")
        .await;

    assert_eq!(fault_code(&response), 0);
}

#[tokio::test]
async fn test_non_xml_content_type_is_rejected() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);

    let response = server
        .post("/pingback")
        .bytes(Bytes::from(common::pingback_call("https://a.example/", PUBLISHED_POST)))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), 415);
}

#[tokio::test]
async fn test_x_pingback_header_is_advertised() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);

    let response = send_ping(&server, "not a url", PUBLISHED_POST).await;

    assert_eq!(response.header("x-pingback"), common::PINGBACK_ENDPOINT);
}
