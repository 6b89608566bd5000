//! JSON body extractors that run `validator` rules.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use tradeguard_core::error::ControlPlaneError;

use crate::error::ApiError;

/// A JSON body that must be present, parse, and validate.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ControlPlaneError::invalid_request(rejection.body_text()))?;
        validate(&value)?;
        Ok(Self(value))
    }
}

/// A JSON body that may be omitted entirely; an empty body yields
/// `T::default()`.
#[derive(Debug, Clone)]
pub struct OptionalJson<T>(pub T);

impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ControlPlaneError::invalid_request(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| ControlPlaneError::invalid_request(format!("Invalid JSON body: {e}")))?;
        validate(&value)?;
        Ok(Self(value))
    }
}

fn validate<T: Validate>(value: &T) -> Result<(), ApiError> {
    value
        .validate()
        .map_err(|errors| ApiError(ControlPlaneError::invalid_request(errors.to_string())))
}
