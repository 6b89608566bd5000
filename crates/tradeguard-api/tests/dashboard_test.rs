//! Integration tests for the read-only dashboard endpoints.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use uuid::Uuid;

use tradeguard_entity::dashboard::ActivityEntry;

use helpers::TestApp;

fn event(summary: &str, minutes_ago: i64) -> ActivityEntry {
    ActivityEntry {
        id: Uuid::new_v4(),
        client_id: "acme".into(),
        kind: "order.filled".into(),
        summary: summary.into(),
        metadata: serde_json::json!({}),
        occurred_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

#[tokio::test]
async fn test_summary_reflects_control_flags() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let before = app
        .request("GET", "/v1/dashboard/summary", None, Some(&token))
        .await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["clientId"], "acme");
    assert_eq!(before.body["paused"], false);
    assert_eq!(before.body["strategiesTotal"], 1);

    app.request("POST", "/v1/controls/pause-all", None, Some(&token))
        .await;

    let after = app
        .request("GET", "/v1/dashboard/summary", None, Some(&token))
        .await;
    assert_eq!(after.body["paused"], true);
}

#[tokio::test]
async fn test_strategies_lists_allocations() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request("GET", "/v1/strategies", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body[0]["strategyId"], "momentum");
}

#[tokio::test]
async fn test_activity_pages_with_cursor() {
    let app = TestApp::new();
    let token = app.access_token().await;
    for (i, label) in ["a", "b", "c"].iter().enumerate() {
        app.tenants.push_event(event(label, i as i64 + 1));
    }

    let first = app
        .request("GET", "/v1/activity?limit=2", None, Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let items = first.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["summary"], "a");
    let cursor = first.body["nextCursor"].as_str().unwrap().to_string();

    let second = app
        .request(
            "GET",
            &format!("/v1/activity?limit=2&cursor={}", cursor.replace('+', "%2B")),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    let items = second.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["summary"], "c");
    assert!(second.body["nextCursor"].is_null());
}

#[tokio::test]
async fn test_malformed_cursor_is_invalid_request() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request("GET", "/v1/activity?cursor=yesterday", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");
}

#[tokio::test]
async fn test_reads_respect_tenant_scope() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request(
            "GET",
            "/v1/dashboard/summary?clientId=globex",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
