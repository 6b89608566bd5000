//! Integration tests for guarded control actions.

mod helpers;

use axum::http::StatusCode;

use tradeguard_core::config::controls::ControlsConfig;
use tradeguard_database::TenantControlRepository;
use tradeguard_entity::control::ControlAction;

use helpers::TestApp;

fn confirmed() -> serde_json::Value {
    serde_json::json!({ "confirmToken": "confirm-123" })
}

#[tokio::test]
async fn test_kill_switch_sets_flag_and_fans_out() {
    let mut app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request(
            "POST",
            "/v1/controls/kill-switch",
            Some(confirmed()),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::json!({ "status": "kill_requested" }));

    let controls = app.tenants.get_controls("acme").await.unwrap();
    assert!(controls.kill_switch_active);
    assert_eq!(
        controls.kill_requested_by.as_deref(),
        Some("mobile:auth0|trader:iphone-15")
    );

    let tasks = app.tenants.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, "tenant.shutdown");

    let audit = app.tenants.audit_entries();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].metadata["confirmTokenProvided"], true);
    assert!(!audit[0].metadata.to_string().contains("confirm-123"));

    let notification = app.next_notification().await;
    assert_eq!(notification.action, ControlAction::KillSwitch);
    assert_eq!(notification.client_id, "acme");
}

#[tokio::test]
async fn test_kill_switch_without_confirm_token_changes_nothing() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request("POST", "/v1/controls/kill-switch", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "confirm_token_required");
    assert!(!app.tenants.get_controls("acme").await.unwrap().kill_switch_active);
    assert!(app.tenants.audit_entries().is_empty());
    assert!(app.tenants.tasks().is_empty());
}

#[tokio::test]
async fn test_pause_all_needs_no_confirm_token() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let paused = app
        .request("POST", "/v1/controls/pause-all", None, Some(&token))
        .await;
    assert_eq!(paused.status, StatusCode::OK);
    assert_eq!(paused.body["status"], "pause_requested");
    assert!(app.tenants.get_controls("acme").await.unwrap().paused);

    let resumed = app
        .request(
            "POST",
            "/v1/controls/resume-all",
            Some(serde_json::json!({})),
            Some(&token),
        )
        .await;
    assert_eq!(resumed.status, StatusCode::OK);
    assert_eq!(resumed.body["status"], "resume_requested");
    assert!(!app.tenants.get_controls("acme").await.unwrap().paused);
}

#[tokio::test]
async fn test_required_mfa_is_enforced() {
    let app = TestApp::with_controls(ControlsConfig {
        require_mfa: true,
        ..ControlsConfig::default()
    });
    let token = app.access_token().await;

    let refused = app
        .request("POST", "/v1/controls/pause-all", None, Some(&token))
        .await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert_eq!(refused.body["error"], "mfa_token_required");

    let accepted = app
        .request(
            "POST",
            "/v1/controls/pause-all",
            Some(serde_json::json!({ "mfaToken": "step-up" })),
            Some(&token),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_strategy_pause_and_resume() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let paused = app
        .request(
            "POST",
            "/v1/controls/strategies/momentum/pause",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(paused.status, StatusCode::OK);
    assert_eq!(
        paused.body,
        serde_json::json!({ "status": "strategy_paused", "strategyId": "momentum" })
    );

    let resumed = app
        .request(
            "POST",
            "/v1/controls/strategies/momentum/resume",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(resumed.status, StatusCode::OK);
    assert_eq!(resumed.body["status"], "strategy_resumed");
}

#[tokio::test]
async fn test_unknown_strategy_is_not_found() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request(
            "POST",
            "/v1/controls/strategies/ghost/pause",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "strategy_allocation_not_found");
    assert!(app.tenants.audit_entries().is_empty());
}

#[tokio::test]
async fn test_tenant_outside_scope_is_forbidden() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let from_body = app
        .request(
            "POST",
            "/v1/controls/pause-all",
            Some(serde_json::json!({ "clientId": "globex" })),
            Some(&token),
        )
        .await;
    assert_eq!(from_body.status, StatusCode::FORBIDDEN);
    assert_eq!(from_body.body["error"], "client_scope_missing");

    let from_query = app
        .request(
            "POST",
            "/v1/controls/pause-all?clientId=globex",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(from_query.status, StatusCode::FORBIDDEN);
    assert!(!app.tenants.get_controls("globex").await.unwrap().paused);
}

#[tokio::test]
async fn test_queue_outage_does_not_fail_the_action() {
    let app = TestApp::new();
    let token = app.access_token().await;
    app.tenants.fail_task_queue(true);

    let response = app
        .request(
            "POST",
            "/v1/controls/kill-switch",
            Some(confirmed()),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let audit = app.tenants.audit_entries();
    assert_eq!(audit[0].metadata["taskEnqueued"], false);
}

#[tokio::test]
async fn test_controls_require_bearer() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/v1/controls/kill-switch", Some(confirmed()), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
