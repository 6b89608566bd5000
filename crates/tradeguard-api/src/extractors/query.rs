//! Query string extractor with the API's error body.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use tradeguard_core::error::ControlPlaneError;

use crate::error::ApiError;

/// Like [`Query`], but a malformed query string is an `invalid_request`.
#[derive(Debug, Clone, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ControlPlaneError::invalid_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}
