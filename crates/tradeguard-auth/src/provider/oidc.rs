//! Auth0-style OIDC provider over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use tradeguard_core::AppResult;
use tradeguard_core::config::identity::IdentityProviderConfig;
use tradeguard_core::error::ControlPlaneError;

use super::claims::identity_from_claims;
use super::{AuthorizationRequest, IdentityProvider, ProviderGrant, ProviderIdentity};

/// Grant type for completing an OTP challenge.
const MFA_OTP_GRANT: &str = "http://auth0.com/oauth/grant-type/mfa-otp";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    mfa_token: Option<String>,
}

/// Identity provider speaking the `/authorize`, `/oauth/token`, and
/// `/userinfo` endpoints under one issuer.
#[derive(Debug, Clone)]
pub struct OidcIdentityProvider {
    client: reqwest::Client,
    config: IdentityProviderConfig,
    issuer: String,
}

impl OidcIdentityProvider {
    /// Creates a provider client from configuration.
    pub fn new(config: IdentityProviderConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ControlPlaneError::configuration(format!("Failed to build HTTP client: {e}")))?;
        let issuer = config.issuer.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            config,
            issuer,
        })
    }

    fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.issuer)
    }

    fn with_client_credentials(&self, mut body: Value) -> Value {
        body["client_id"] = json!(self.config.client_id);
        if let Some(secret) = &self.config.client_secret {
            body["client_secret"] = json!(secret);
        }
        body
    }

    async fn post_token(&self, body: &Value) -> AppResult<(StatusCode, String)> {
        let response = self
            .client
            .post(self.token_endpoint())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                ControlPlaneError::identity_provider(format!("Token endpoint request failed: {e}"))
            })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ControlPlaneError::identity_provider(format!("Failed to read token response: {e}"))
        })?;
        Ok((status, text))
    }

    async fn fetch_identity(&self, access_token: &str) -> AppResult<ProviderIdentity> {
        let response = self
            .client
            .get(format!("{}/userinfo", self.issuer))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                ControlPlaneError::identity_provider(format!("Userinfo request failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(ControlPlaneError::identity_provider(format!(
                "Userinfo endpoint returned {}",
                response.status()
            )));
        }

        let claims: Value = response.json().await.map_err(|e| {
            ControlPlaneError::identity_provider(format!("Failed to parse userinfo: {e}"))
        })?;
        identity_from_claims(&claims, &self.config.claims_namespace)
    }
}

fn parse_access_token(body: &str) -> AppResult<String> {
    serde_json::from_str::<TokenResponse>(body)
        .map(|t| t.access_token)
        .map_err(|e| ControlPlaneError::identity_provider(format!("Failed to parse token response: {e}")))
}

fn parse_error(body: &str) -> TokenErrorResponse {
    serde_json::from_str(body).unwrap_or_default()
}

#[async_trait]
impl IdentityProvider for OidcIdentityProvider {
    fn authorization_url(&self, request: &AuthorizationRequest<'_>) -> AppResult<String> {
        let mut url = Url::parse(&format!("{}/authorize", self.issuer)).map_err(|e| {
            ControlPlaneError::configuration(format!("Invalid identity provider issuer: {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", request.redirect_uri)
            .append_pair("scope", request.scope)
            .append_pair("state", request.state)
            .append_pair("code_challenge", request.code_challenge)
            .append_pair("code_challenge_method", "S256");

        if let Some(audience) = &self.config.audience {
            url.query_pairs_mut().append_pair("audience", audience);
        }

        Ok(url.to_string())
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> AppResult<ProviderGrant> {
        let body = self.with_client_credentials(json!({
            "grant_type": "authorization_code",
            "code": code,
            "code_verifier": code_verifier,
            "redirect_uri": redirect_uri,
        }));

        let (status, text) = self.post_token(&body).await?;

        if status.is_success() {
            let access_token = parse_access_token(&text)?;
            let identity = self.fetch_identity(&access_token).await?;
            return Ok(ProviderGrant::Authenticated(identity));
        }

        let error = parse_error(&text);
        if error.error.as_deref() == Some("mfa_required") {
            debug!("Identity provider requested step-up authentication");
            return match error.mfa_token.filter(|t| !t.is_empty()) {
                Some(mfa_token) => Ok(ProviderGrant::MfaRequired { mfa_token }),
                None => Err(ControlPlaneError::MfaTokenMissing),
            };
        }

        warn!(
            status = %status,
            error = ?error.error,
            "Authorization code exchange rejected"
        );
        Err(ControlPlaneError::identity_provider(format!(
            "Token endpoint returned {status}: {}",
            error
                .error_description
                .or(error.error)
                .unwrap_or_else(|| "unknown error".to_string())
        )))
    }

    async fn verify_otp(&self, mfa_token: &str, otp: &str) -> AppResult<ProviderIdentity> {
        let body = self.with_client_credentials(json!({
            "grant_type": MFA_OTP_GRANT,
            "mfa_token": mfa_token,
            "otp": otp,
        }));

        let (status, text) = self.post_token(&body).await?;

        if status.is_success() {
            let access_token = parse_access_token(&text)?;
            return self.fetch_identity(&access_token).await;
        }

        if status.is_server_error() {
            return Err(ControlPlaneError::identity_provider(format!(
                "Token endpoint returned {status}"
            )));
        }

        let error = parse_error(&text);
        warn!(status = %status, error = ?error.error, "OTP rejected by identity provider");
        Err(ControlPlaneError::MfaVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(audience: Option<&str>) -> OidcIdentityProvider {
        OidcIdentityProvider::new(IdentityProviderConfig {
            issuer: "https://tenant.auth.example/".to_string(),
            client_id: "mobile-app".to_string(),
            client_secret: None,
            audience: audience.map(str::to_string),
            claims_namespace: "https://tradeguard.app/".to_string(),
            mfa_methods: vec!["otp".to_string()],
            request_timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_authorization_url_carries_pkce_parameters() {
        let url = provider(Some("https://api.tradeguard.app"))
            .authorization_url(&AuthorizationRequest {
                state: "st4te",
                code_challenge: "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
                redirect_uri: "app://auth",
                scope: "openid offline_access",
            })
            .unwrap();

        assert!(url.starts_with("https://tenant.auth.example/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("state=st4te"));
        assert!(url.contains("redirect_uri=app%3A%2F%2Fauth"));
        assert!(url.contains("audience=https%3A%2F%2Fapi.tradeguard.app"));
    }

    #[test]
    fn test_error_body_parsing_tolerates_garbage() {
        let parsed = parse_error("<html>bad gateway</html>");
        assert!(parsed.error.is_none());

        let parsed = parse_error(r#"{"error":"mfa_required","mfa_token":"m-1"}"#);
        assert_eq!(parsed.error.as_deref(), Some("mfa_required"));
        assert_eq!(parsed.mfa_token.as_deref(), Some("m-1"));
    }
}
