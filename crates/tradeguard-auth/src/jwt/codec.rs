//! HS256 access token codec.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use tradeguard_core::config::auth::AuthConfig;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_entity::session::{AccessTokenPayload, DeviceSession};

/// Issues and verifies stateless access tokens.
///
/// Tokens are three base64url segments signed with HMAC-SHA256 and carry
/// the session's identity, roles, and tenant scope.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
        }
    }

    /// Lifetime of newly issued access tokens.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Signs an access token for `session`.
    pub fn issue(
        &self,
        session: &DeviceSession,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, ControlPlaneError> {
        let payload = AccessTokenPayload {
            session_id: session.session_id,
            sub: session.user_id.clone(),
            email: session.user_email.clone(),
            name: session.user_name.clone(),
            roles: session.roles.clone(),
            client_ids: session.client_ids.clone(),
            device_id: session.device_id.clone(),
            plan: session.plan.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| ControlPlaneError::internal(format!("Failed to encode access token: {e}")))
    }

    /// Verifies signature and expiry. Never touches storage.
    pub fn verify(&self, token: &str) -> Result<AccessTokenPayload, ControlPlaneError> {
        let data = decode::<AccessTokenPayload>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ControlPlaneError::unauthorized("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    ControlPlaneError::unauthorized("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    ControlPlaneError::unauthorized("Invalid token format")
                }
                _ => ControlPlaneError::unauthorized(format!("Token validation failed: {e}")),
            })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::with_secret("an-hmac-key-of-at-least-32-bytes!!"))
    }

    fn session() -> DeviceSession {
        let now = Utc::now();
        DeviceSession {
            session_id: Uuid::new_v4(),
            user_id: "auth0|trader".into(),
            user_email: Some("trader@example.com".into()),
            user_name: None,
            plan: Some("pro".into()),
            device_id: "pixel-8".into(),
            refresh_token_hash: String::new(),
            access_token_expires_at: now,
            roles: vec!["owner".into()],
            client_ids: vec!["acme".into(), "globex".into()],
            push_token: None,
            platform: None,
            app_version: None,
            metadata: serde_json::json!({}),
            last_seen_at: now,
            created_at: now,
        }
    }

    #[test]
    fn test_issue_then_verify_carries_scope() {
        let codec = codec();
        let session = session();
        let now = Utc::now();
        let token = codec.issue(&session, now, now + codec.access_ttl()).unwrap();

        assert_eq!(token.split('.').count(), 3);
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.session_id, session.session_id);
        assert_eq!(claims.device_id, "pixel-8");
        assert_eq!(claims.client_ids, vec!["acme".to_string(), "globex".to_string()]);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(2);
        let token = codec
            .issue(&session(), issued, issued + Duration::hours(1))
            .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = TokenCodec::new(&AuthConfig::with_secret("a-completely-different-secret-key!!"));
        let now = Utc::now();
        let token = other.issue(&session(), now, now + Duration::minutes(5)).unwrap();

        assert!(codec().verify(&token).is_err());
    }
}
