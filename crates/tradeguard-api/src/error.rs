//! Maps `ControlPlaneError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use tradeguard_core::error::{ControlPlaneError, ErrorKind};

/// Flat error body: `{"error": code, "details"?: ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Stable machine-readable code.
    pub error: String,
    /// Optional details, only for client-caused errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler error wrapper.
#[derive(Debug)]
pub struct ApiError(pub ControlPlaneError);

impl From<ControlPlaneError> for ApiError {
    fn from(err: ControlPlaneError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error.
pub fn status_for(err: &ControlPlaneError) -> StatusCode {
    match err {
        ControlPlaneError::InvalidMfaCode
        | ControlPlaneError::UnknownMfaChallenge
        | ControlPlaneError::InvalidRefreshToken => StatusCode::BAD_REQUEST,
        ControlPlaneError::ClientScopeMissing => StatusCode::FORBIDDEN,
        _ => match err.kind() {
            ErrorKind::Protocol | ErrorKind::Validation | ErrorKind::Authorization => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::StepUp | ErrorKind::Session => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(&err);

        match err.kind() {
            ErrorKind::Internal => {
                tracing::error!(error = %err, "Internal server error");
            }
            ErrorKind::Upstream => {
                tracing::warn!(error = %err, "Upstream failure");
            }
            _ => {}
        }

        let body = ApiErrorResponse {
            error: err.code().to_string(),
            details: err.details(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert_eq!(status_for(&ControlPlaneError::RedirectMismatch), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&ControlPlaneError::ConfirmTokenRequired), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&ControlPlaneError::unauthorized("invalid_token")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&ControlPlaneError::MfaVerificationFailed),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&ControlPlaneError::InvalidMfaCode), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&ControlPlaneError::ClientScopeMissing), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&ControlPlaneError::StrategyAllocationNotFound),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ControlPlaneError::identity_provider("timeout")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ControlPlaneError::database("pool closed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
