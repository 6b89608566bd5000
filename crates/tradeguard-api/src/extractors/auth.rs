//! `AuthUser` extractor: bearer token, session row, device binding.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use tradeguard_auth::AuthenticatedContext;
use tradeguard_core::AppResult;
use tradeguard_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedContext);

impl AuthUser {
    /// Resolve the tenant this request acts on.
    pub fn tenant(&self, requested: Option<&str>) -> AppResult<RequestContext> {
        RequestContext::resolve(&self.0, requested)
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AuthenticatedContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A missing or non-bearer header is treated as no token
        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());

        let ctx = state.auth.authenticate(token).await?;
        Ok(AuthUser(ctx))
    }
}
