//! Identity provider (OIDC) client configuration.

use serde::{Deserialize, Serialize};

/// Settings for the upstream OAuth2/OIDC identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProviderConfig {
    /// Issuer base URL, e.g. `https://tenant.eu.auth0.com`.
    pub issuer: String,
    /// OAuth client ID registered for the mobile app.
    pub client_id: String,
    /// Client secret, when the provider requires one for code exchange.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// API audience requested at authorization time.
    #[serde(default)]
    pub audience: Option<String>,
    /// Prefix of the custom `roles`, `client_ids`, and `plan` claims.
    #[serde(default = "default_claims_namespace")]
    pub claims_namespace: String,
    /// Step-up methods advertised to clients when MFA is required.
    #[serde(default = "default_mfa_methods")]
    pub mfa_methods: Vec<String>,
    /// HTTP timeout for provider calls.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_claims_namespace() -> String {
    "https://tradeguard.app/".to_string()
}

fn default_mfa_methods() -> Vec<String> {
    vec!["otp".to_string()]
}

fn default_timeout() -> u64 {
    10
}
