//! Device registration handler.

use axum::extract::State;
use axum::http::StatusCode;

use tradeguard_entity::session::DeviceRegistration;

use crate::dto::request::RegisterDeviceRequest;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /v1/devices/register
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RegisterDeviceRequest>,
) -> Result<StatusCode, ApiError> {
    let registration = DeviceRegistration {
        push_token: req.push_token,
        platform: req.platform,
        app_version: req.app_version,
    };
    state
        .auth
        .register_device(&auth, &req.device_id, &registration)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
