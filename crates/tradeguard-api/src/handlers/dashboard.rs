//! Read-only dashboard handlers.

use axum::Json;
use axum::extract::State;

use tradeguard_entity::dashboard::{ActivityPage, DashboardSummary, StrategyAllocation};
use tradeguard_service::dashboard::parse_cursor;

use crate::dto::request::{ActivityQuery, TenantQuery};
use crate::error::ApiError;
use crate::extractors::{AuthUser, QueryParams};
use crate::state::AppState;

/// GET /v1/dashboard/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<TenantQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let ctx = auth.tenant(query.client_id.as_deref())?;
    let summary = state.dashboard.summary(&ctx.client_id).await?;
    Ok(Json(summary))
}

/// GET /v1/strategies
pub async fn strategies(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<TenantQuery>,
) -> Result<Json<Vec<StrategyAllocation>>, ApiError> {
    let ctx = auth.tenant(query.client_id.as_deref())?;
    let strategies = state.dashboard.strategies(&ctx.client_id).await?;
    Ok(Json(strategies))
}

/// GET /v1/activity?cursor=&limit=
pub async fn activity(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ActivityQuery>,
) -> Result<Json<ActivityPage>, ApiError> {
    let ctx = auth.tenant(query.client_id.as_deref())?;
    let cursor = parse_cursor(query.cursor.as_deref())?;
    let page = state
        .dashboard
        .activity(&ctx.client_id, cursor, query.limit)
        .await?;
    Ok(Json(page))
}
