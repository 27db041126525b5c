mod common;

use axum::{Router, middleware};
use axum_test::TestServer;
use blog_pingback::api;
use blog_pingback::api::middleware::auth;
use blog_pingback::state::AppState;

use common::{ADMIN_TOKEN, PUBLISHED_POST};

fn test_server(state: AppState) -> TestServer {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
    let app = Router::new().nest("/api", api_router).with_state(state);

    TestServer::new(app).unwrap()
}

fn bearer() -> String {
    format!("Bearer {}", ADMIN_TOKEN)
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);

    let response = server.get("/api/pingbacks").await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.header("www-authenticate"), "Bearer");
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);

    let response = server
        .get("/api/pingbacks")
        .add_header("Authorization", "Bearer wrong-token")
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_list_pingbacks_newest_first() {
    let (state, _rx) = common::create_test_state();
    common::store_pingback(&state, "https://a.example/one", PUBLISHED_POST).await;
    let newest = common::store_pingback(&state, "https://b.example/two", PUBLISHED_POST).await;
    let server = test_server(state);

    let response = server
        .get("/api/pingbacks")
        .add_header("Authorization", bearer())
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["pagination"]["total_items"], 2);
    assert_eq!(json["pagination"]["total_pages"], 1);
    assert_eq!(json["items"][0]["id"], newest);
    assert_eq!(json["items"][0]["source_domain"], "b.example");
    assert_eq!(json["items"][1]["source_url"], "https://a.example/one");
}

#[tokio::test]
async fn test_invalid_page_size() {
    let (state, _rx) = common::create_test_state();
    let server = test_server(state);

    let response = server
        .get("/api/pingbacks")
        .add_query_param("page_size", 5)
        .add_header("Authorization", bearer())
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_delete_pingback() {
    let (state, _rx) = common::create_test_state();
    let repository = state.repository.clone();
    let id = common::store_pingback(&state, "https://a.example/one", PUBLISHED_POST).await;
    let server = test_server(state);

    let response = server
        .delete(&format!("/api/pingbacks/{}", id))
        .add_header("Authorization", bearer())
        .await;
    assert_eq!(response.status_code(), 204);
    assert_eq!(repository.count().await.unwrap(), 0);

    let again = server
        .delete(&format!("/api/pingbacks/{}", id))
        .add_header("Authorization", bearer())
        .await;
    assert_eq!(again.status_code(), 404);
}

#[tokio::test]
async fn test_clear_pingbacks() {
    let (state, _rx) = common::create_test_state();
    common::store_pingback(&state, "https://a.example/one", PUBLISHED_POST).await;
    common::store_pingback(&state, "https://b.example/two", PUBLISHED_POST).await;
    let server = test_server(state);

    let response = server
        .delete("/api/pingbacks")
        .add_header("Authorization", bearer())
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["deleted"], 2);
}
