//! Route definitions for the TradeGuard HTTP API.
//!
//! REST routes are mounted under `/v1`; `/health` and `/ws` sit at the root.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route, threading `AppState` through.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(control_routes())
        .merge(device_routes())
        .merge(dashboard_routes());

    Router::new()
        .nest("/v1", api_routes)
        .route("/health", get(handlers::health::health))
        .route("/ws", get(handlers::ws::ws_handler))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/pkce/start", post(handlers::auth::start_pkce))
        .route("/auth/exchange", post(handlers::auth::exchange))
        .route("/auth/mfa/verify", post(handlers::auth::verify_mfa))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/session", get(handlers::auth::session))
}

fn control_routes() -> Router<AppState> {
    Router::new()
        .route("/controls/kill-switch", post(handlers::controls::kill_switch))
        .route("/controls/pause-all", post(handlers::controls::pause_all))
        .route("/controls/resume-all", post(handlers::controls::resume_all))
        .route(
            "/controls/strategies/{strategy_id}/pause",
            post(handlers::controls::pause_strategy),
        )
        .route(
            "/controls/strategies/{strategy_id}/resume",
            post(handlers::controls::resume_strategy),
        )
}

fn device_routes() -> Router<AppState> {
    Router::new().route("/devices/register", post(handlers::devices::register))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/summary", get(handlers::dashboard::summary))
        .route("/strategies", get(handlers::dashboard::strategies))
        .route("/activity", get(handlers::dashboard::activity))
}
