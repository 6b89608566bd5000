//! Inputs and outputs of [`super::AuthService`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradeguard_core::error::ControlPlaneError;
use tradeguard_entity::session::{AccessTokenPayload, DeviceSession};

/// Parameters of `start_pkce`.
#[derive(Debug, Clone, Default)]
pub struct StartPkce {
    /// S256 challenge of the device's verifier.
    pub code_challenge: String,
    /// Where the provider sends the device back.
    pub redirect_uri: String,
    /// Device identifier, if the app already has one.
    pub device_id: Option<String>,
    /// Requested scope; the configured default when absent.
    pub scope: Option<String>,
}

/// Result of `start_pkce`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkceStarted {
    /// Opaque state the provider echoes back.
    pub state: String,
    /// URL the device opens.
    pub authorization_url: String,
    /// When the state stops being redeemable.
    pub expires_at: DateTime<Utc>,
}

/// Parameters of `exchange_code`.
#[derive(Debug, Clone, Default)]
pub struct ExchangeCode {
    /// State from `start_pkce`.
    pub state: String,
    /// Authorization code from the provider redirect.
    pub code: String,
    /// PKCE verifier.
    pub code_verifier: String,
    /// Redirect URI; must equal the one recorded at start.
    pub redirect_uri: String,
    /// Device identifier.
    pub device_id: Option<String>,
}

/// User profile embedded in a [`SessionResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Subject identifier.
    pub id: String,
    /// Email.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Plan.
    pub plan: Option<String>,
    /// Roles.
    pub roles: Vec<String>,
    /// Tenant scope.
    pub client_ids: Vec<String>,
}

impl From<&DeviceSession> for SessionUser {
    fn from(session: &DeviceSession) -> Self {
        Self {
            id: session.user_id.clone(),
            email: session.user_email.clone(),
            name: session.user_name.clone(),
            plan: session.plan.clone(),
            roles: session.roles.clone(),
            client_ids: session.client_ids.clone(),
        }
    }
}

/// A newly created device session with its first token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Signed access token.
    pub access_token: String,
    /// Refresh secret; shown once.
    pub refresh_token: String,
    /// Access token expiry.
    pub expires_at: DateTime<Utc>,
    /// Session identifier.
    pub session_id: Uuid,
    /// Device the session is bound to.
    pub device_id: String,
    /// Profile.
    pub user: SessionUser,
}

/// Result of `exchange_code`: a session, or a step-up branch.
#[derive(Debug, Clone)]
pub enum ExchangeOutcome {
    /// Login completed.
    Session(Box<SessionResponse>),
    /// The provider requires a second factor.
    MfaRequired {
        /// Challenge to answer through `verify_mfa`.
        challenge_id: Uuid,
        /// Offered methods.
        methods: Vec<String>,
    },
}

/// A verified caller: token claims plus the live session row.
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    /// Claims of the presented token.
    pub claims: AccessTokenPayload,
    /// Session row the token belongs to.
    pub session: DeviceSession,
}

impl AuthenticatedContext {
    /// Session identifier.
    pub fn session_id(&self) -> Uuid {
        self.session.session_id
    }

    /// Bound device.
    pub fn device_id(&self) -> &str {
        &self.session.device_id
    }

    /// Audit actor string.
    pub fn actor(&self) -> String {
        self.session.actor()
    }
}

/// Why a presented access token was refused.
///
/// The realtime hub closes sockets with the reason string; HTTP callers
/// see every variant except `Store` as `unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No token was presented.
    MissingToken,
    /// Bad signature, malformed, or expired.
    InvalidToken,
    /// The session row is gone or bound to another device.
    SessionRevoked,
    /// The session lookup itself failed.
    Store(ControlPlaneError),
}

impl AuthRejection {
    /// Stable reason string.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::SessionRevoked => "session_revoked",
            Self::Store(_) => "internal_error",
        }
    }
}

impl From<AuthRejection> for ControlPlaneError {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::Store(err) => err,
            other => ControlPlaneError::unauthorized(other.reason()),
        }
    }
}
