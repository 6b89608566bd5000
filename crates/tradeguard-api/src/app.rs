//! Application builder and server bootstrap.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use chrono::Utc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use tradeguard_auth::{AuthService, OidcIdentityProvider};
use tradeguard_core::AppResult;
use tradeguard_core::config::AppConfig;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_database::DatabasePool;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::{AppState, Stores};

/// Interval of the expired authorization-state and challenge sweep.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the TradeGuard server until Ctrl+C.
pub async fn run_server(config: AppConfig, db: &DatabasePool) -> AppResult<()> {
    tracing::info!("Starting TradeGuard server...");

    // ── Step 1: Identity provider ────────────────────────────────
    let provider = Arc::new(OidcIdentityProvider::new(config.identity_provider.clone())?);
    tracing::info!(issuer = %config.identity_provider.issuer, "Identity provider configured");

    // ── Step 2: Services ─────────────────────────────────────────
    let state = AppState::assemble(config, Stores::postgres(db), provider, Vec::new())?;

    // ── Step 3: Expired-row sweep ────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = tokio::spawn(purge_loop(state.auth.clone(), shutdown_rx.clone()));

    // ── Step 4: HTTP server ──────────────────────────────────────
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ControlPlaneError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("TradeGuard server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut drain_rx = shutdown_rx;
    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| ControlPlaneError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            let _ = drain_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed; dropping open connections");
        }
    }

    sweep.abort();
    tracing::info!("TradeGuard server stopped");
    Ok(())
}

async fn purge_loop(auth: AuthService, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(PURGE_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match auth.purge_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "Purged expired authorization rows"),
                    Err(e) => tracing::warn!(error = %e, "Expired-row sweep failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C; shutting down");
    }
    tracing::info!("Shutdown signal received");
}
