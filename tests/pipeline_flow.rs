mod common;

use axum::routing::{get, post};
use axum::Router;
use axum_test::TestServer;
use linktrack::api::handlers::{
    access_check_handler, create_link_handler, redirect_handler, url_stats_handler,
};
use serde_json::json;

fn test_server(ctx: &common::TestContext) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/api/links", post(create_link_handler))
        .route("/api/stats/{url}", get(url_stats_handler))
        .route("/api/stats/{url}/access", get(access_check_handler))
        .with_state(ctx.state.clone());
    TestServer::new(app).unwrap()
}

/// End-to-end flow with the broker leg simulated: create an alias, resolve
/// it, deliver both emitted events through their wire encoding, and read the
/// stats back.
#[tokio::test]
async fn test_create_resolve_and_settle() {
    let mut ctx = common::create_test_state();
    let server = test_server(&ctx);

    let created = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "user_id": 42 }))
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let code = created.json::<serde_json::Value>()["code"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(code.len(), 5);

    let resolved = server.get(&format!("/{code}")).await;
    resolved.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resolved.headers().get("location").unwrap(),
        "https://example.com"
    );

    // Nothing is counted until the events settle.
    let early = server.get(&format!("/api/stats/{code}")).await;
    assert_eq!(early.json::<serde_json::Value>()["total_accesses"], 0);

    let delivered = common::deliver_pending_events(&mut ctx).await;
    assert_eq!(delivered, 2, "one create event and one resolve event");

    // Only the anonymous resolve event counts toward the global total; the
    // create event carried user 42.
    let stats = server.get(&format!("/api/stats/{code}")).await;
    assert_eq!(stats.json::<serde_json::Value>()["total_accesses"], 1);

    let creator = server
        .get(&format!("/api/stats/{code}/access"))
        .add_query_param("user_id", "42")
        .await;
    assert_eq!(creator.json::<serde_json::Value>()["accessed"], json!(true));

    let anonymous = server
        .get(&format!("/api/stats/{code}/access"))
        .add_query_param("user_id", "0")
        .await;
    assert_eq!(
        anonymous.json::<serde_json::Value>()["accessed"],
        json!(true)
    );
}

/// N resolves of the same alias settle to a total of N.
#[tokio::test]
async fn test_repeated_resolves_accumulate() {
    let mut ctx = common::create_test_state();
    ctx.aliases.insert("aB3xZ", "https://example.com");
    let server = test_server(&ctx);

    for _ in 0..5 {
        server
            .get("/aB3xZ")
            .await
            .assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
    }

    assert_eq!(common::deliver_pending_events(&mut ctx).await, 5);

    let stats = server.get("/api/stats/aB3xZ").await;
    assert_eq!(stats.json::<serde_json::Value>()["total_accesses"], 5);
}

/// Counting is commutative: ingestion order never changes the totals.
#[tokio::test]
async fn test_aggregation_is_order_independent() {
    let events = [
        (0i64, "aB3xZ"),
        (42, "aB3xZ"),
        (0, "aB3xZ"),
        (0, "xYz12"),
        (7, "xYz12"),
        (0, "aB3xZ"),
    ];

    let forward = common::create_test_state();
    for (user_id, url) in events {
        forward.analytics.record(user_id, url).await.unwrap();
    }

    let reverse = common::create_test_state();
    for (user_id, url) in events.iter().rev() {
        reverse.analytics.record(*user_id, url).await.unwrap();
    }

    for ctx in [&forward, &reverse] {
        assert_eq!(ctx.analytics.url_stats("aB3xZ").await.unwrap(), 3);
        assert_eq!(ctx.analytics.url_stats("xYz12").await.unwrap(), 1);
        assert!(ctx.analytics.has_accessed("aB3xZ", 42).await.unwrap());
        assert!(ctx.analytics.has_accessed("xYz12", 7).await.unwrap());
    }
}

/// Delivery is at-least-once and counting has no deduplication: redelivering
/// the same event counts it again. This pins the documented approximation -
/// it must not silently become exactly-once.
#[tokio::test]
async fn test_redelivery_inflates_count() {
    let ctx = common::create_test_state();

    ctx.analytics.record(0, "aB3xZ").await.unwrap();
    assert_eq!(ctx.analytics.url_stats("aB3xZ").await.unwrap(), 1);

    // The broker redelivers the identical event.
    ctx.analytics.record(0, "aB3xZ").await.unwrap();
    assert_eq!(ctx.analytics.url_stats("aB3xZ").await.unwrap(), 2);
    assert_eq!(ctx.store.raw_event_count(), 2);
}

/// `has_accessed` never reverts to false once set.
#[tokio::test]
async fn test_access_presence_is_monotonic() {
    let ctx = common::create_test_state();

    assert!(!ctx.analytics.has_accessed("aB3xZ", 42).await.unwrap());

    ctx.analytics.record(42, "aB3xZ").await.unwrap();
    assert!(ctx.analytics.has_accessed("aB3xZ", 42).await.unwrap());

    // Unrelated traffic does not disturb the flag.
    ctx.analytics.record(0, "aB3xZ").await.unwrap();
    ctx.analytics.record(42, "xYz12").await.unwrap();
    assert!(ctx.analytics.has_accessed("aB3xZ", 42).await.unwrap());
}
