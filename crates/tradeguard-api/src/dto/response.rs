//! Response DTOs.

use serde::Serialize;
use uuid::Uuid;

use tradeguard_auth::service::SessionUser;
use tradeguard_auth::AuthenticatedContext;

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// `{"mfaRequired": true, ...}` branch of the code exchange.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaRequiredResponse {
    /// Always `true`.
    pub mfa_required: bool,
    /// Challenge to answer.
    pub challenge_id: Uuid,
    /// Offered methods.
    pub methods: Vec<String>,
}

/// `GET /v1/auth/session`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfileResponse {
    /// Session identifier.
    pub session_id: Uuid,
    /// Bound device.
    pub device_id: String,
    /// Profile, roles, and tenant scope.
    pub user: SessionUser,
    /// Registered push platform.
    pub platform: Option<String>,
    /// Whether a push token is bound.
    pub push_registered: bool,
}

impl From<&AuthenticatedContext> for SessionProfileResponse {
    fn from(ctx: &AuthenticatedContext) -> Self {
        Self {
            session_id: ctx.session_id(),
            device_id: ctx.device_id().to_string(),
            user: SessionUser::from(&ctx.session),
            platform: ctx.session.platform.clone(),
            push_registered: ctx.session.push_token.is_some(),
        }
    }
}
