mod common;

use axum::{routing::get, Router};
use axum_test::TestServer;
use linktrack::api::handlers::{access_check_handler, url_stats_handler};
use serde_json::json;

fn test_server(ctx: &common::TestContext) -> TestServer {
    let app = Router::new()
        .route("/api/stats/{url}", get(url_stats_handler))
        .route("/api/stats/{url}/access", get(access_check_handler))
        .with_state(ctx.state.clone());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_stats_zero_for_unseen_url() {
    let ctx = common::create_test_state();
    let server = test_server(&ctx);

    let response = server.get("/api/stats/aB3xZ").await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["url"], "aB3xZ");
    assert_eq!(body["total_accesses"], 0);
}

#[tokio::test]
async fn test_stats_counts_only_anonymous_accesses() {
    let ctx = common::create_test_state();
    let server = test_server(&ctx);

    for _ in 0..3 {
        ctx.analytics.record(0, "aB3xZ").await.unwrap();
    }
    // Create-time events carry a real user id and are excluded from the
    // global total.
    ctx.analytics.record(42, "aB3xZ").await.unwrap();

    let response = server.get("/api/stats/aB3xZ").await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["total_accesses"], 3);
}

#[tokio::test]
async fn test_access_check_false_then_true() {
    let ctx = common::create_test_state();
    let server = test_server(&ctx);

    let before = server
        .get("/api/stats/aB3xZ/access")
        .add_query_param("user_id", "42")
        .await;
    before.assert_status_ok();
    assert_eq!(before.json::<serde_json::Value>()["accessed"], json!(false));

    ctx.analytics.record(42, "aB3xZ").await.unwrap();

    let after = server
        .get("/api/stats/aB3xZ/access")
        .add_query_param("user_id", "42")
        .await;
    after.assert_status_ok();
    let body = after.json::<serde_json::Value>();
    assert_eq!(body["accessed"], json!(true));
    assert_eq!(body["user_id"], 42);
}

#[tokio::test]
async fn test_access_check_is_exact_on_user() {
    let ctx = common::create_test_state();
    let server = test_server(&ctx);

    ctx.analytics.record(42, "aB3xZ").await.unwrap();

    let other_user = server
        .get("/api/stats/aB3xZ/access")
        .add_query_param("user_id", "43")
        .await;
    assert_eq!(
        other_user.json::<serde_json::Value>()["accessed"],
        json!(false)
    );
}

#[tokio::test]
async fn test_access_check_requires_user_id() {
    let ctx = common::create_test_state();
    let server = test_server(&ctx);

    let response = server.get("/api/stats/aB3xZ/access").await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "validation_error"
    );
}
