//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use tradeguard_api::{AppState, Stores, build_app};
use tradeguard_auth::pkce::s256_challenge;
use tradeguard_auth::provider::AuthorizationRequest;
use tradeguard_auth::{IdentityProvider, ProviderGrant, ProviderIdentity};
use tradeguard_core::AppResult;
use tradeguard_core::config::app::ServerConfig;
use tradeguard_core::config::auth::AuthConfig;
use tradeguard_core::config::controls::ControlsConfig;
use tradeguard_core::config::identity::IdentityProviderConfig;
use tradeguard_core::config::logging::LoggingConfig;
use tradeguard_core::config::notifications::NotificationsConfig;
use tradeguard_core::config::realtime::RealtimeConfig;
use tradeguard_core::config::{AppConfig, DatabaseConfig};
use tradeguard_core::error::ControlPlaneError;
use tradeguard_database::memory::{MemorySessionStore, MemoryTenantStore};
use tradeguard_entity::control::ControlNotificationPayload;
use tradeguard_entity::dashboard::StrategyAllocation;
use tradeguard_service::NotificationChannel;

/// PKCE verifier used by every scripted login.
pub const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
/// The only allow-listed redirect URI.
pub const REDIRECT: &str = "tradeguard://auth/callback";

/// Scripted identity provider.
///
/// Code `"mfa"` demands step-up; OTP `"123456"` completes it; code
/// `"boom"` fails upstream; anything else logs in a trader scoped to `acme`.
pub struct FakeProvider;

fn trader() -> ProviderIdentity {
    ProviderIdentity {
        sub: "auth0|trader".into(),
        email: Some("trader@acme.io".into()),
        name: Some("Ada".into()),
        plan: Some("pro".into()),
        roles: vec!["owner".into()],
        client_ids: vec!["acme".into()],
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(&self, request: &AuthorizationRequest<'_>) -> AppResult<String> {
        Ok(format!(
            "https://idp.test/authorize?response_type=code&state={}&code_challenge={}&code_challenge_method=S256",
            request.state, request.code_challenge
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        _code_verifier: &str,
        _redirect_uri: &str,
    ) -> AppResult<ProviderGrant> {
        match code {
            "mfa" => Ok(ProviderGrant::MfaRequired {
                mfa_token: "mfa-token-1".into(),
            }),
            "boom" => Err(ControlPlaneError::identity_provider("503 from issuer")),
            _ => Ok(ProviderGrant::Authenticated(trader())),
        }
    }

    async fn verify_otp(&self, mfa_token: &str, otp: &str) -> AppResult<ProviderIdentity> {
        if mfa_token == "mfa-token-1" && otp == "123456" {
            Ok(trader())
        } else {
            Err(ControlPlaneError::MfaVerificationFailed)
        }
    }
}

/// Records every notification the router delivers.
pub struct RecordingChannel {
    tx: mpsc::UnboundedSender<ControlNotificationPayload>,
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, payload: &ControlNotificationPayload) -> AppResult<()> {
        let _ = self.tx.send(payload.clone());
        Ok(())
    }
}

/// Response of a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Parsed JSON body, `Null` when empty.
    pub body: Value,
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Session-side store
    pub sessions: Arc<MemorySessionStore>,
    /// Tenant-side store
    pub tenants: Arc<MemoryTenantStore>,
    /// Notifications delivered by guarded actions
    pub notifications: mpsc::UnboundedReceiver<ControlNotificationPayload>,
}

/// Configuration pointing at nothing external.
pub fn test_config(controls: ControlsConfig) -> AppConfig {
    let mut auth = AuthConfig::with_secret("integration-secret-0123456789abcdef");
    auth.allowed_redirect_uris = vec![REDIRECT.to_string()];

    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused/tradeguard".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
            run_migrations: false,
        },
        auth,
        identity_provider: IdentityProviderConfig {
            issuer: "https://idp.test".to_string(),
            client_id: "mobile".to_string(),
            client_secret: None,
            audience: None,
            claims_namespace: "https://tradeguard.app/".to_string(),
            mfa_methods: vec!["otp".to_string()],
            request_timeout_seconds: 1,
        },
        controls,
        notifications: NotificationsConfig::default(),
        realtime: RealtimeConfig::default(),
        logging: LoggingConfig::default(),
    }
}

impl TestApp {
    /// App with the default control policy.
    pub fn new() -> Self {
        Self::with_controls(ControlsConfig::default())
    }

    /// App with a specific control policy.
    pub fn with_controls(controls: ControlsConfig) -> Self {
        let sessions = Arc::new(MemorySessionStore::new());
        let tenants = Arc::new(MemoryTenantStore::new());
        tenants.seed_strategy(StrategyAllocation {
            client_id: "acme".into(),
            strategy_id: "momentum".into(),
            name: "Momentum".into(),
            enabled: true,
            allocation: 2500.0,
            updated_at: Utc::now(),
        });

        let (tx, notifications) = mpsc::unbounded_channel();
        let stores = Stores {
            sessions: sessions.clone(),
            controls: tenants.clone(),
            audit: tenants.clone(),
            tasks: tenants.clone(),
            dashboard: tenants.clone(),
        };
        let state = AppState::assemble(
            test_config(controls),
            stores,
            Arc::new(FakeProvider),
            vec![Arc::new(RecordingChannel { tx })],
        )
        .expect("Failed to assemble state");

        Self {
            router: build_app(state),
            sessions,
            tenants,
            notifications,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Start a PKCE login and return the state.
    pub async fn start_login(&self, device_id: &str) -> String {
        let response = self
            .request(
                "POST",
                "/v1/auth/pkce/start",
                Some(serde_json::json!({
                    "codeChallenge": s256_challenge(VERIFIER),
                    "redirectUri": REDIRECT,
                    "deviceId": device_id,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["state"]
            .as_str()
            .expect("No state in response")
            .to_string()
    }

    /// Redeem a state with an authorization code.
    pub async fn exchange(&self, state: &str, code: &str) -> TestResponse {
        self.request(
            "POST",
            "/v1/auth/exchange",
            Some(serde_json::json!({
                "state": state,
                "code": code,
                "codeVerifier": VERIFIER,
                "redirectUri": REDIRECT,
            })),
            None,
        )
        .await
    }

    /// Full login; returns the session response body.
    pub async fn login(&self) -> Value {
        let state = self.start_login("iphone-15").await;
        let response = self.exchange(&state, "ok").await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body
    }

    /// Full login; returns the access token.
    pub async fn access_token(&self) -> String {
        self.login().await["accessToken"]
            .as_str()
            .expect("No accessToken in session response")
            .to_string()
    }

    /// Wait for the next delivered notification.
    pub async fn next_notification(&mut self) -> ControlNotificationPayload {
        tokio::time::timeout(Duration::from_secs(2), self.notifications.recv())
            .await
            .expect("Timed out waiting for notification")
            .expect("Notification channel closed")
    }
}
