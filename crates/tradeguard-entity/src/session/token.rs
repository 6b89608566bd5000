//! Token value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a signed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    /// Session the token was issued for.
    pub session_id: Uuid,
    /// Identity-provider subject.
    pub sub: String,
    /// User email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role claims.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Tenant scope.
    #[serde(default)]
    pub client_ids: Vec<String>,
    /// Device the session is bound to.
    pub device_id: String,
    /// Plan claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

/// An access/refresh pair handed to the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    /// Signed access token.
    pub access_token: String,
    /// Opaque refresh secret, shown to the client exactly once.
    pub refresh_token: String,
    /// Access token expiry.
    pub expires_at: DateTime<Utc>,
}
