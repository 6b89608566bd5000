//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use tradeguard_core::AppResult;
use tradeguard_core::error::ControlPlaneError;

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| ControlPlaneError::database(format!("Failed to run migrations: {e}")))?;

    info!("Database migrations completed");
    Ok(())
}
