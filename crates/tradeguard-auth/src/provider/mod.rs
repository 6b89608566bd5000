//! Upstream identity provider seam.

pub mod claims;
pub mod oidc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tradeguard_core::AppResult;

pub use oidc::OidcIdentityProvider;

/// Identity released by the provider after a completed login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Subject identifier.
    pub sub: String,
    /// Email address.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Subscription plan.
    pub plan: Option<String>,
    /// Role claims.
    pub roles: Vec<String>,
    /// Tenant scope.
    pub client_ids: Vec<String>,
}

/// Outcome of a code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderGrant {
    /// The login completed.
    Authenticated(ProviderIdentity),
    /// The provider demands a second factor before releasing tokens.
    MfaRequired {
        /// Token to present alongside the OTP.
        mfa_token: String,
    },
}

/// Parameters of the authorization redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest<'a> {
    /// Opaque state.
    pub state: &'a str,
    /// S256 code challenge.
    pub code_challenge: &'a str,
    /// Redirect URI.
    pub redirect_uri: &'a str,
    /// Requested scope.
    pub scope: &'a str,
}

/// An OAuth2/OIDC provider supporting PKCE and OTP step-up.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Build the URL the device opens to log in.
    fn authorization_url(&self, request: &AuthorizationRequest<'_>) -> AppResult<String>;

    /// Exchange an authorization code using the PKCE verifier.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> AppResult<ProviderGrant>;

    /// Complete a step-up challenge with a one-time code.
    async fn verify_otp(&self, mfa_token: &str, otp: &str) -> AppResult<ProviderIdentity>;
}
