//! Device session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One authenticated device login.
///
/// The refresh token is never stored, only its SHA-256 hex digest. The
/// tenant scope (`client_ids`) is captured from identity-provider claims
/// at login and is not re-derived until the device signs in again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeviceSession {
    /// Unique session identifier, embedded in every access token.
    pub session_id: Uuid,
    /// Identity-provider subject.
    pub user_id: String,
    /// User email (if released by the provider).
    pub user_email: Option<String>,
    /// Display name.
    pub user_name: Option<String>,
    /// Subscription plan claim.
    pub plan: Option<String>,
    /// Device this session is bound to.
    pub device_id: String,
    /// SHA-256 hex digest of the current refresh token.
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    /// Expiry of the most recently issued access token.
    pub access_token_expires_at: DateTime<Utc>,
    /// Role claims.
    pub roles: Vec<String>,
    /// Tenant scope.
    pub client_ids: Vec<String>,
    /// Push notification token registered by the device.
    pub push_token: Option<String>,
    /// Device platform (`ios`, `android`).
    pub platform: Option<String>,
    /// App version reported at registration.
    pub app_version: Option<String>,
    /// Free-form metadata (JSON).
    pub metadata: serde_json::Value,
    /// Last authenticated request.
    pub last_seen_at: DateTime<Utc>,
    /// Login time. Refresh expiry is measured from here.
    pub created_at: DateTime<Utc>,
}

impl DeviceSession {
    /// Whether the absolute refresh lifetime has elapsed at `now`.
    pub fn refresh_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }

    /// Audit actor string for actions taken through this session.
    pub fn actor(&self) -> String {
        format!("mobile:{}:{}", self.user_id, self.device_id)
    }

    /// Whether the session may act on `client_id`.
    pub fn has_client(&self, client_id: &str) -> bool {
        self.client_ids.iter().any(|c| c == client_id)
    }
}

/// Data required to create a new device session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceSession {
    /// Pre-generated session identifier.
    pub session_id: Uuid,
    /// Identity-provider subject.
    pub user_id: String,
    /// User email.
    pub user_email: Option<String>,
    /// Display name.
    pub user_name: Option<String>,
    /// Plan claim.
    pub plan: Option<String>,
    /// Bound device.
    pub device_id: String,
    /// SHA-256 hex digest of the first refresh token.
    pub refresh_token_hash: String,
    /// Expiry of the first access token.
    pub access_token_expires_at: DateTime<Utc>,
    /// Role claims.
    pub roles: Vec<String>,
    /// Tenant scope.
    pub client_ids: Vec<String>,
    /// Login time.
    pub created_at: DateTime<Utc>,
}

/// Push registration submitted by a device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceRegistration {
    /// Push notification token.
    pub push_token: Option<String>,
    /// Platform name.
    pub platform: Option<String>,
    /// App version.
    pub app_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(created_at: DateTime<Utc>) -> DeviceSession {
        DeviceSession {
            session_id: Uuid::new_v4(),
            user_id: "auth0|42".into(),
            user_email: None,
            user_name: None,
            plan: None,
            device_id: "ipad-1".into(),
            refresh_token_hash: "h".into(),
            access_token_expires_at: created_at,
            roles: vec![],
            client_ids: vec!["acme".into()],
            push_token: None,
            platform: None,
            app_version: None,
            metadata: serde_json::json!({}),
            last_seen_at: created_at,
            created_at,
        }
    }

    #[test]
    fn test_actor_format() {
        assert_eq!(session(Utc::now()).actor(), "mobile:auth0|42:ipad-1");
    }

    #[test]
    fn test_refresh_expiry_uses_creation_time() {
        let s = session(Utc::now() - Duration::days(31));
        assert!(s.refresh_expired(Utc::now(), Duration::days(30)));
        assert!(!session(Utc::now()).refresh_expired(Utc::now(), Duration::days(30)));
    }

    #[test]
    fn test_refresh_hash_not_serialized() {
        let json = serde_json::to_value(session(Utc::now())).unwrap();
        assert!(json.get("refresh_token_hash").is_none());
    }
}
