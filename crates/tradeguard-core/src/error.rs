//! Control-plane error taxonomy.
//!
//! Every failure a mobile client can observe is one variant of
//! [`ControlPlaneError`]. The stable string returned by
//! [`ControlPlaneError::code`] is the wire contract; the variant set is
//! closed so that every handler matches it exhaustively.

use std::fmt;

use thiserror::Error;

/// Coarse classification of an error, used to pick the HTTP status and
/// log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// PKCE / redirect protocol violation detected locally.
    Protocol,
    /// Step-up (MFA) failure; clients route these to the OTP screen.
    StepUp,
    /// Session or token failure.
    Session,
    /// Authenticated caller is not allowed to perform the action as submitted.
    Authorization,
    /// A scoped resource does not exist.
    NotFound,
    /// Malformed request body or parameters.
    Validation,
    /// The identity provider or another upstream failed.
    Upstream,
    /// Storage, configuration, or other server-side failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol => write!(f, "PROTOCOL"),
            Self::StepUp => write!(f, "STEP_UP"),
            Self::Session => write!(f, "SESSION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Upstream => write!(f, "UPSTREAM"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The closed set of errors produced by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    // -- Protocol --
    /// No authorization state matches, or it has expired or been redeemed.
    #[error("authorization state is unknown, expired, or already redeemed")]
    InvalidState,
    /// The redirect URI differs from the one recorded at PKCE start.
    #[error("redirect URI does not match the authorization request")]
    RedirectMismatch,
    /// The redirect URI could not be parsed.
    #[error("redirect URI is malformed")]
    InvalidRedirectUri,
    /// The redirect URI failed both the allow-list and the scheme check.
    #[error("redirect URI is not allowed")]
    RedirectNotAllowed,
    /// The code challenge is too short or not base64url.
    #[error("code challenge is invalid")]
    InvalidCodeChallenge,
    /// The code verifier does not hash to the stored challenge.
    #[error("code verifier does not match the code challenge")]
    InvalidCodeVerifier,

    // -- Step-up --
    /// No MFA challenge matches, or it has expired.
    #[error("MFA challenge is unknown or expired")]
    UnknownMfaChallenge,
    /// The OTP is not plausibly formatted.
    #[error("MFA code is malformed")]
    InvalidMfaCode,
    /// The identity provider rejected the OTP.
    #[error("MFA verification failed")]
    MfaVerificationFailed,
    /// The identity provider demanded MFA without issuing an MFA token.
    #[error("identity provider required MFA but issued no MFA token")]
    MfaTokenMissing,

    // -- Session --
    /// The refresh token is empty.
    #[error("refresh token is missing")]
    InvalidRefreshToken,
    /// No session matches the presented refresh token.
    #[error("session not found")]
    SessionNotFound,
    /// The session is older than the absolute refresh TTL.
    #[error("refresh token has expired")]
    RefreshTokenExpired,
    /// Missing, invalid, or revoked access token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The device identity presented does not match the session's device.
    #[error("device does not match the authenticated session")]
    DeviceMismatch,

    // -- Authorization --
    /// The caller has no tenant scope, or asked for a tenant outside it.
    #[error("client is not within the caller's scope")]
    ClientScopeMissing,
    /// The guarded action requires a confirm token.
    #[error("confirm token required")]
    ConfirmTokenRequired,
    /// Policy requires an MFA token for guarded actions.
    #[error("MFA token required")]
    MfaTokenRequired,
    /// Policy requires a biometric signature for guarded actions.
    #[error("biometric signature required")]
    BiometricSignatureRequired,
    /// The tenant has no allocation for the strategy.
    #[error("strategy allocation not found")]
    StrategyAllocationNotFound,

    // -- Infrastructure --
    /// Malformed request body or parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The identity provider failed or returned an unexpected response.
    #[error("identity provider error: {0}")]
    IdentityProvider(String),
    /// A storage operation failed.
    #[error("database error: {0}")]
    Database(String),
    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Any other server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlPlaneError {
    /// Stable machine-readable code surfaced to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidState => "invalid_state",
            Self::RedirectMismatch => "redirect_mismatch",
            Self::InvalidRedirectUri => "invalid_redirect_uri",
            Self::RedirectNotAllowed => "redirect_not_allowed",
            Self::InvalidCodeChallenge => "invalid_code_challenge",
            Self::InvalidCodeVerifier => "invalid_code_verifier",
            Self::UnknownMfaChallenge => "unknown_mfa_challenge",
            Self::InvalidMfaCode => "invalid_mfa_code",
            Self::MfaVerificationFailed => "mfa_verification_failed",
            Self::MfaTokenMissing => "mfa_token_missing",
            Self::InvalidRefreshToken => "invalid_refresh_token",
            Self::SessionNotFound => "session_not_found",
            Self::RefreshTokenExpired => "refresh_token_expired",
            Self::Unauthorized(_) => "unauthorized",
            Self::DeviceMismatch => "device_mismatch",
            Self::ClientScopeMissing => "client_scope_missing",
            Self::ConfirmTokenRequired => "confirm_token_required",
            Self::MfaTokenRequired => "mfa_token_required",
            Self::BiometricSignatureRequired => "biometric_signature_required",
            Self::StrategyAllocationNotFound => "strategy_allocation_not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::IdentityProvider(_) => "identity_provider_error",
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// The error's classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidState
            | Self::RedirectMismatch
            | Self::InvalidRedirectUri
            | Self::RedirectNotAllowed
            | Self::InvalidCodeChallenge
            | Self::InvalidCodeVerifier => ErrorKind::Protocol,
            Self::UnknownMfaChallenge
            | Self::InvalidMfaCode
            | Self::MfaVerificationFailed
            | Self::MfaTokenMissing => ErrorKind::StepUp,
            Self::InvalidRefreshToken
            | Self::SessionNotFound
            | Self::RefreshTokenExpired
            | Self::Unauthorized(_)
            | Self::DeviceMismatch => ErrorKind::Session,
            Self::ClientScopeMissing
            | Self::ConfirmTokenRequired
            | Self::MfaTokenRequired
            | Self::BiometricSignatureRequired => ErrorKind::Authorization,
            Self::StrategyAllocationNotFound => ErrorKind::NotFound,
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::IdentityProvider(_) => ErrorKind::Upstream,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Optional detail payload safe to show to clients.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::InvalidRequest(details) => Some(details.clone()),
            _ => None,
        }
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a validation error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an identity provider error.
    pub fn identity_provider(message: impl Into<String>) -> Self {
        Self::IdentityProvider(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for ControlPlaneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {err}"))
    }
}

impl From<config::ConfigError> for ControlPlaneError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
