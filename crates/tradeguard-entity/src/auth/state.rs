//! PKCE authorization state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One pending PKCE login, keyed by the opaque `state` value.
///
/// Redeemable exactly once, and only against the redirect URI it was
/// created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuthorizationState {
    /// Opaque random value echoed back by the identity provider.
    pub state: String,
    /// Base64url SHA-256 of the client's code verifier.
    pub code_challenge: String,
    /// Redirect URI recorded at start.
    pub redirect_uri: String,
    /// Device the login was started from, if the client supplied one.
    pub device_id: Option<String>,
    /// Requested OAuth scope.
    pub scope: String,
    /// When the login was started.
    pub created_at: DateTime<Utc>,
    /// Hint for the sweeper; the authoritative check is [`Self::is_expired`].
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationState {
    /// Whether the state is past its validity window at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.created_at > window || now >= self.expires_at
    }
}
