//! Step-up MFA challenge.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A pending step-up challenge created when the identity provider
/// demands MFA mid-login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MfaChallenge {
    /// Identifier handed to the client.
    pub challenge_id: Uuid,
    /// Provider-issued MFA token. Never leaves the server.
    #[serde(skip_serializing)]
    pub mfa_token: String,
    /// Authorization state the challenge was raised for.
    pub state: String,
    /// Device carried over from the authorization state or exchange call.
    pub device_id: Option<String>,
    /// Step-up methods offered to the client.
    pub methods: Vec<String>,
    /// When the challenge was raised.
    pub created_at: DateTime<Utc>,
    /// Hint for the sweeper.
    pub expires_at: DateTime<Utc>,
}

impl MfaChallenge {
    /// Whether the challenge is past its validity window at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.created_at > window || now >= self.expires_at
    }
}
