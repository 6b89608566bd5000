//! Device authentication configuration.

use serde::{Deserialize, Serialize};

/// Minimum HMAC key length accepted for access-token signing.
pub const MIN_TOKEN_SECRET_BYTES: usize = 32;

/// PKCE, token, and session lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access-token signing (HMAC-SHA256).
    pub token_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh TTL in days, measured from session creation.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// How long a PKCE authorization state stays redeemable.
    #[serde(default = "default_state_ttl")]
    pub authorization_state_ttl_seconds: u64,
    /// How long an MFA challenge stays redeemable.
    #[serde(default = "default_mfa_ttl")]
    pub mfa_challenge_ttl_seconds: u64,
    /// Minimum accepted length of a PKCE code challenge.
    #[serde(default = "default_min_challenge")]
    pub min_code_challenge_length: usize,
    /// Exact redirect URI allow-list. Takes precedence over the scheme list.
    #[serde(default)]
    pub allowed_redirect_uris: Vec<String>,
    /// Permitted redirect URI schemes when no allow-list is configured.
    #[serde(default = "default_redirect_schemes")]
    pub allowed_redirect_schemes: Vec<String>,
    /// Scope requested when the client does not supply one.
    #[serde(default = "default_scope")]
    pub default_scope: String,
    /// Clock-skew leeway applied to `exp` validation, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl AuthConfig {
    /// Builds a configuration with default lifetimes around the given secret.
    pub fn with_secret(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            authorization_state_ttl_seconds: default_state_ttl(),
            mfa_challenge_ttl_seconds: default_mfa_ttl(),
            min_code_challenge_length: default_min_challenge(),
            allowed_redirect_uris: Vec::new(),
            allowed_redirect_schemes: default_redirect_schemes(),
            default_scope: default_scope(),
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_state_ttl() -> u64 {
    300
}

fn default_mfa_ttl() -> u64 {
    300
}

fn default_min_challenge() -> usize {
    43
}

fn default_redirect_schemes() -> Vec<String> {
    vec!["tradeguard".to_string()]
}

fn default_scope() -> String {
    "openid profile email offline_access".to_string()
}

fn default_leeway() -> u64 {
    5
}
