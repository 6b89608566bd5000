//! Tenant control flags backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use tradeguard_core::AppResult;
use tradeguard_entity::control::TenantControlState;
use tradeguard_entity::dashboard::StrategyAllocation;

use super::db_error;
use crate::traits::TenantControlRepository;

/// Repository for `tenant_controls` and `strategy_allocations`.
#[derive(Debug, Clone)]
pub struct PgTenantControlRepository {
    pool: PgPool,
}

impl PgTenantControlRepository {
    /// Create a new tenant control repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantControlRepository for PgTenantControlRepository {
    async fn get_controls(&self, client_id: &str) -> AppResult<TenantControlState> {
        let row = sqlx::query_as::<_, TenantControlState>(
            "SELECT * FROM tenant_controls WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load tenant controls"))?;
        Ok(row.unwrap_or_else(|| TenantControlState::inactive(client_id)))
    }

    async fn activate_kill_switch(
        &self,
        client_id: &str,
        actor: &str,
    ) -> AppResult<TenantControlState> {
        sqlx::query_as::<_, TenantControlState>(
            "INSERT INTO tenant_controls \
             (client_id, kill_switch_active, kill_requested_at, kill_requested_by, updated_at) \
             VALUES ($1, TRUE, NOW(), $2, NOW()) \
             ON CONFLICT (client_id) DO UPDATE SET \
                kill_switch_active = TRUE, \
                kill_requested_at = NOW(), \
                kill_requested_by = EXCLUDED.kill_requested_by, \
                updated_at = NOW() \
             RETURNING *",
        )
        .bind(client_id)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to activate kill switch"))
    }

    async fn set_paused(&self, client_id: &str, paused: bool) -> AppResult<TenantControlState> {
        sqlx::query_as::<_, TenantControlState>(
            "INSERT INTO tenant_controls (client_id, paused, paused_at, updated_at) \
             VALUES ($1, $2, CASE WHEN $2 THEN NOW() END, NOW()) \
             ON CONFLICT (client_id) DO UPDATE SET \
                paused = EXCLUDED.paused, \
                paused_at = EXCLUDED.paused_at, \
                updated_at = NOW() \
             RETURNING *",
        )
        .bind(client_id)
        .bind(paused)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to update pause flag"))
    }

    async fn set_strategy_enabled(
        &self,
        client_id: &str,
        strategy_id: &str,
        enabled: bool,
    ) -> AppResult<Option<StrategyAllocation>> {
        sqlx::query_as::<_, StrategyAllocation>(
            "UPDATE strategy_allocations SET enabled = $3, updated_at = NOW() \
             WHERE client_id = $1 AND strategy_id = $2 RETURNING *",
        )
        .bind(client_id)
        .bind(strategy_id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update strategy allocation"))
    }
}
