//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use tradeguard_service::Confirmation;

/// `POST /v1/auth/pkce/start`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartPkceRequest {
    /// S256 challenge; length is checked by the auth service.
    pub code_challenge: String,
    /// Where the provider should redirect.
    #[validate(length(min = 1, max = 2048, message = "redirectUri is required"))]
    pub redirect_uri: String,
    /// Device identifier.
    #[validate(length(max = 128))]
    pub device_id: Option<String>,
    /// Requested OAuth scope.
    #[validate(length(max = 512))]
    pub scope: Option<String>,
}

/// `POST /v1/auth/exchange`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    /// State from PKCE start.
    pub state: String,
    /// Authorization code.
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// PKCE verifier (RFC 7636 length bounds).
    #[validate(length(min = 43, max = 128, message = "codeVerifier must be 43-128 characters"))]
    pub code_verifier: String,
    /// Redirect URI used at start.
    #[validate(length(min = 1, message = "redirectUri is required"))]
    pub redirect_uri: String,
    /// Device identifier.
    #[validate(length(max = 128))]
    pub device_id: Option<String>,
}

/// `POST /v1/auth/mfa/verify`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyMfaRequest {
    /// Challenge identifier.
    pub challenge_id: String,
    /// One-time code.
    pub otp: String,
    /// Device identifier.
    #[validate(length(max = 128))]
    pub device_id: Option<String>,
}

/// `POST /v1/auth/refresh`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Current refresh token.
    #[serde(default)]
    pub refresh_token: String,
}

/// Body of every guarded control endpoint. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
    /// Tenant to act on.
    #[validate(length(max = 128))]
    pub client_id: Option<String>,
    /// Explicit confirmation.
    #[validate(length(max = 512))]
    pub confirm_token: Option<String>,
    /// Step-up token.
    #[validate(length(max = 512))]
    pub mfa_token: Option<String>,
    /// Biometric signature.
    #[validate(length(max = 4096))]
    pub biometric_signature: Option<String>,
}

impl ControlRequest {
    /// The confirmation artifacts.
    pub fn confirmation(&self) -> Confirmation {
        Confirmation {
            confirm_token: self.confirm_token.clone(),
            mfa_token: self.mfa_token.clone(),
            biometric_signature: self.biometric_signature.clone(),
        }
    }
}

/// `POST /v1/devices/register`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    /// Must equal the session's device.
    #[validate(length(min = 1, max = 128, message = "deviceId is required"))]
    pub device_id: String,
    /// Push token.
    #[validate(length(max = 512))]
    pub push_token: Option<String>,
    /// `ios` / `android` / ...
    #[validate(length(max = 32))]
    pub platform: Option<String>,
    /// App version string.
    #[validate(length(max = 32))]
    pub app_version: Option<String>,
}

/// `?clientId=` on read endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantQuery {
    /// Tenant to read.
    pub client_id: Option<String>,
}

/// `GET /v1/activity`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    /// Tenant to read.
    pub client_id: Option<String>,
    /// RFC 3339 timestamp of the last item already received.
    pub cursor: Option<String>,
    /// Page size, clamped to 1..=100.
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_verifier_fails_validation() {
        let req = ExchangeRequest {
            state: "s".into(),
            code: "c".into(),
            code_verifier: "short".into(),
            redirect_uri: "app://auth".into(),
            device_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_control_request_defaults_are_empty() {
        let req: ControlRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(!req.confirmation().has_confirm_token());
    }
}
