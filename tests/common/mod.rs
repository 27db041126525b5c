#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;
use url::Url;

use blog_pingback::application::services::{AuthService, PingbackReceiver, PingbackSender};
use blog_pingback::domain::entities::NewPingback;
use blog_pingback::domain::pingback_event::PingbackEvent;
use blog_pingback::domain::repositories::PingbackRepository;
use blog_pingback::infrastructure::content::HtmlLinkExtractor;
use blog_pingback::infrastructure::moderation::NullModerator;
use blog_pingback::infrastructure::persistence::MemoryPingbackRepository;
use blog_pingback::infrastructure::remote::{
    HttpPingTransport, HttpSourceInspector, HttpTargetResolver, build_http_client,
};
use blog_pingback::protocol::xmlrpc::{PINGBACK_METHOD, encode_method_call};
use blog_pingback::state::AppState;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const PUBLISHED_POST: &str = "https://blog.example/2024/hello";
pub const PINGBACK_ENDPOINT: &str = "https://blog.example/pingback";

pub fn url(input: &str) -> Url {
    Url::parse(input).unwrap()
}

pub fn http_client() -> reqwest::Client {
    build_http_client("blog-pingback-tests").unwrap()
}

/// State wired with real HTTP adapters, an in-memory store holding
/// [`PUBLISHED_POST`], and no moderation.
pub fn create_test_state() -> (AppState, mpsc::Receiver<PingbackEvent>) {
    let (tx, rx) = mpsc::channel(100);
    let client = http_client();
    let timeout = Duration::from_secs(5);

    let repository: Arc<dyn PingbackRepository> = Arc::new(
        MemoryPingbackRepository::with_targets([&url(PUBLISHED_POST)]),
    );
    let moderator = Arc::new(NullModerator::new());

    let receiver = PingbackReceiver::new(
        repository.clone(),
        Arc::new(HttpSourceInspector::new(client.clone())),
        moderator.clone(),
        timeout,
    )
    .with_events(tx.clone());

    let sender = PingbackSender::new(
        Arc::new(HttpTargetResolver::new(client.clone())),
        Arc::new(HttpPingTransport::new(client)),
        timeout,
        4,
    );

    let state = AppState {
        receiver: Arc::new(receiver),
        sender: Arc::new(sender),
        repository,
        link_extractor: Arc::new(HtmlLinkExtractor),
        moderator,
        auth_service: Arc::new(AuthService::new(Some(ADMIN_TOKEN))),
        event_sender: tx,
        pingback_endpoint: HeaderValue::from_static(PINGBACK_ENDPOINT),
        behind_proxy: false,
    };

    (state, rx)
}

pub async fn store_pingback(state: &AppState, source: &str, target: &str) -> i64 {
    let source_url = url(source);
    let new_pingback = NewPingback {
        source_domain: source_url.host_str().unwrap().to_string(),
        source_url,
        source_title: Some("Stored".to_string()),
        target_url: url(target),
        source_ip: Some("192.0.2.1".parse().unwrap()),
    };

    state.repository.save_pingback(new_pingback).await.unwrap().id
}

pub fn pingback_call(source: &str, target: &str) -> Vec<u8> {
    let params = [source, target];
    encode_method_call(PINGBACK_METHOD, &params[..])
}

pub fn html_page(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Reply post</title></head><body>{}</body></html>",
        body
    )
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
