//! Auth handlers: PKCE start, code exchange, MFA, refresh, logout, session.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use tradeguard_auth::service::{ExchangeCode, ExchangeOutcome, PkceStarted, SessionResponse, StartPkce};
use tradeguard_entity::session::SessionTokens;

use crate::dto::request::{ExchangeRequest, RefreshRequest, StartPkceRequest, VerifyMfaRequest};
use crate::dto::response::{MfaRequiredResponse, SessionProfileResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /v1/auth/pkce/start
pub async fn start_pkce(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<StartPkceRequest>,
) -> Result<Json<PkceStarted>, ApiError> {
    let started = state
        .auth
        .start_pkce(StartPkce {
            code_challenge: req.code_challenge,
            redirect_uri: req.redirect_uri,
            device_id: req.device_id,
            scope: req.scope,
        })
        .await?;
    Ok(Json(started))
}

/// POST /v1/auth/exchange
///
/// Answers with a session, or with `{mfaRequired: true, ...}` when the
/// provider asks for a second factor.
pub async fn exchange(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ExchangeRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .auth
        .exchange_code(ExchangeCode {
            state: req.state,
            code: req.code,
            code_verifier: req.code_verifier,
            redirect_uri: req.redirect_uri,
            device_id: req.device_id,
        })
        .await?;

    Ok(match outcome {
        ExchangeOutcome::Session(session) => Json(*session).into_response(),
        ExchangeOutcome::MfaRequired {
            challenge_id,
            methods,
        } => Json(MfaRequiredResponse {
            mfa_required: true,
            challenge_id,
            methods,
        })
        .into_response(),
    })
}

/// POST /v1/auth/mfa/verify
pub async fn verify_mfa(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyMfaRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .auth
        .verify_mfa(&req.challenge_id, &req.otp, req.device_id)
        .await?;
    Ok(Json(session))
}

/// POST /v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<SessionTokens>, ApiError> {
    let tokens = state.auth.refresh_session(&req.refresh_token).await?;
    Ok(Json(tokens))
}

/// POST /v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    state.auth.sign_out(auth.session_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/auth/session
pub async fn session(auth: AuthUser) -> Json<SessionProfileResponse> {
    Json(SessionProfileResponse::from(&auth.0))
}
