//! Guarded control handlers.
//!
//! The tenant comes from `clientId` in the body, then the query string,
//! then the first tenant in the caller's scope.

use axum::Json;
use axum::extract::{Path, State};

use tradeguard_service::{ControlOutcome, RequestContext};

use crate::dto::request::{ControlRequest, TenantQuery};
use crate::error::ApiError;
use crate::extractors::{AuthUser, OptionalJson, QueryParams};
use crate::state::AppState;

fn resolve_tenant(
    auth: &AuthUser,
    body: &ControlRequest,
    query: &TenantQuery,
) -> Result<RequestContext, ApiError> {
    let requested = body.client_id.as_deref().or(query.client_id.as_deref());
    Ok(auth.tenant(requested)?)
}

/// POST /v1/controls/kill-switch
pub async fn kill_switch(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<TenantQuery>,
    OptionalJson(req): OptionalJson<ControlRequest>,
) -> Result<Json<ControlOutcome>, ApiError> {
    let ctx = resolve_tenant(&auth, &req, &query)?;
    let outcome = state.controls.kill_switch(&ctx, &req.confirmation()).await?;
    Ok(Json(outcome))
}

/// POST /v1/controls/pause-all
pub async fn pause_all(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<TenantQuery>,
    OptionalJson(req): OptionalJson<ControlRequest>,
) -> Result<Json<ControlOutcome>, ApiError> {
    let ctx = resolve_tenant(&auth, &req, &query)?;
    let outcome = state.controls.pause_all(&ctx, &req.confirmation()).await?;
    Ok(Json(outcome))
}

/// POST /v1/controls/resume-all
pub async fn resume_all(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<TenantQuery>,
    OptionalJson(req): OptionalJson<ControlRequest>,
) -> Result<Json<ControlOutcome>, ApiError> {
    let ctx = resolve_tenant(&auth, &req, &query)?;
    let outcome = state.controls.resume_all(&ctx, &req.confirmation()).await?;
    Ok(Json(outcome))
}

/// POST /v1/controls/strategies/{strategyId}/pause
pub async fn pause_strategy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(strategy_id): Path<String>,
    QueryParams(query): QueryParams<TenantQuery>,
    OptionalJson(req): OptionalJson<ControlRequest>,
) -> Result<Json<ControlOutcome>, ApiError> {
    let ctx = resolve_tenant(&auth, &req, &query)?;
    let outcome = state
        .controls
        .pause_strategy(&ctx, &strategy_id, &req.confirmation())
        .await?;
    Ok(Json(outcome))
}

/// POST /v1/controls/strategies/{strategyId}/resume
pub async fn resume_strategy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(strategy_id): Path<String>,
    QueryParams(query): QueryParams<TenantQuery>,
    OptionalJson(req): OptionalJson<ControlRequest>,
) -> Result<Json<ControlOutcome>, ApiError> {
    let ctx = resolve_tenant(&auth, &req, &query)?;
    let outcome = state
        .controls
        .resume_strategy(&ctx, &strategy_id, &req.confirmation())
        .await?;
    Ok(Json(outcome))
}
