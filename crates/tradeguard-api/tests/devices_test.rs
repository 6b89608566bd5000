//! Integration tests for push registration.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_register_own_device() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request(
            "POST",
            "/v1/devices/register",
            Some(serde_json::json!({
                "deviceId": "iphone-15",
                "pushToken": "ExponentPushToken[abc]",
                "platform": "ios",
                "appVersion": "2.4.0",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let profile = app
        .request("GET", "/v1/auth/session", None, Some(&token))
        .await;
    assert_eq!(profile.body["pushRegistered"], true);
    assert_eq!(profile.body["platform"], "ios");
}

#[tokio::test]
async fn test_register_foreign_device_is_refused() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request(
            "POST",
            "/v1/devices/register",
            Some(serde_json::json!({
                "deviceId": "someone-elses-phone",
                "pushToken": "ExponentPushToken[xyz]",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "device_mismatch");
}

#[tokio::test]
async fn test_register_requires_device_id() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let response = app
        .request(
            "POST",
            "/v1/devices/register",
            Some(serde_json::json!({ "deviceId": "" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");
}
