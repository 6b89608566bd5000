//! WebSocket authentication: the same checks as an HTTP request, mapped to
//! close codes instead of status codes.

use tradeguard_auth::{AuthRejection, AuthService, AuthenticatedContext};
use tradeguard_core::error::ControlPlaneError;
use tradeguard_service::RequestContext;

/// Close frame sent when a connection is refused after upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WsRejection {
    /// Application close code (4000-4999) or 1011.
    pub code: u16,
    /// Stable reason string.
    pub reason: &'static str,
}

impl WsRejection {
    /// No token query parameter.
    pub const MISSING_TOKEN: Self = Self { code: 4400, reason: "missing_token" };
    /// Bad signature, malformed, or expired token.
    pub const INVALID_TOKEN: Self = Self { code: 4401, reason: "invalid_token" };
    /// Session row gone or bound to another device.
    pub const SESSION_REVOKED: Self = Self { code: 4403, reason: "session_revoked" };
    /// Requested tenant outside the token's scope.
    pub const CLIENT_SCOPE_MISSING: Self = Self { code: 4404, reason: "client_scope_missing" };
    /// Storage failure while authenticating.
    pub const INTERNAL: Self = Self { code: 1011, reason: "internal_error" };
}

impl From<AuthRejection> for WsRejection {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::MissingToken => Self::MISSING_TOKEN,
            AuthRejection::InvalidToken => Self::INVALID_TOKEN,
            AuthRejection::SessionRevoked => Self::SESSION_REVOKED,
            AuthRejection::Store(_) => Self::INTERNAL,
        }
    }
}

impl From<ControlPlaneError> for WsRejection {
    fn from(err: ControlPlaneError) -> Self {
        match err {
            ControlPlaneError::ClientScopeMissing => Self::CLIENT_SCOPE_MISSING,
            _ => Self::INTERNAL,
        }
    }
}

/// Authenticates hub connections through [`AuthService`].
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    auth: AuthService,
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }

    /// Verifies the token, its session row, and the requested tenant.
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        client_id: Option<&str>,
    ) -> Result<(AuthenticatedContext, RequestContext), WsRejection> {
        let auth = self.auth.authenticate_token(token).await?;
        let ctx = RequestContext::resolve(&auth, client_id)?;
        Ok((auth, ctx))
    }
}
