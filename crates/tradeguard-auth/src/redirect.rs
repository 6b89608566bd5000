//! Redirect URI policy.

use url::Url;

use tradeguard_core::config::auth::AuthConfig;
use tradeguard_core::error::ControlPlaneError;

/// Decides which redirect URIs may reach the identity provider.
///
/// A non-empty exact allow-list takes precedence; otherwise only the
/// configured schemes are accepted.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    allowed_uris: Vec<String>,
    allowed_schemes: Vec<String>,
}

impl RedirectPolicy {
    /// Build the policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            allowed_uris: config.allowed_redirect_uris.clone(),
            allowed_schemes: config
                .allowed_redirect_schemes
                .iter()
                .map(|s| s.trim_end_matches(':').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Accept or reject a redirect URI.
    pub fn check(&self, redirect_uri: &str) -> Result<(), ControlPlaneError> {
        let parsed = Url::parse(redirect_uri).map_err(|_| ControlPlaneError::InvalidRedirectUri)?;

        if !self.allowed_uris.is_empty() {
            return if self.allowed_uris.iter().any(|allowed| allowed == redirect_uri) {
                Ok(())
            } else {
                Err(ControlPlaneError::RedirectNotAllowed)
            };
        }

        if self.allowed_schemes.iter().any(|s| s == parsed.scheme()) {
            Ok(())
        } else {
            Err(ControlPlaneError::RedirectNotAllowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(uris: &[&str], schemes: &[&str]) -> RedirectPolicy {
        let mut config = AuthConfig::with_secret("x".repeat(32));
        config.allowed_redirect_uris = uris.iter().map(|s| s.to_string()).collect();
        config.allowed_redirect_schemes = schemes.iter().map(|s| s.to_string()).collect();
        RedirectPolicy::new(&config)
    }

    #[test]
    fn test_allow_list_requires_exact_match() {
        let policy = policy(&["app://auth"], &["app"]);
        assert!(policy.check("app://auth").is_ok());
        // The scheme list is not consulted once an allow-list exists.
        assert_eq!(
            policy.check("app://auth/other"),
            Err(ControlPlaneError::RedirectNotAllowed)
        );
    }

    #[test]
    fn test_scheme_fallback() {
        let policy = policy(&[], &["tradeguard:"]);
        assert!(policy.check("tradeguard://callback").is_ok());
        assert_eq!(
            policy.check("https://evil.example/callback"),
            Err(ControlPlaneError::RedirectNotAllowed)
        );
    }

    #[test]
    fn test_unparseable_uri() {
        let policy = policy(&[], &["app"]);
        assert_eq!(
            policy.check("not a uri"),
            Err(ControlPlaneError::InvalidRedirectUri)
        );
    }
}
