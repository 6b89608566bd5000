//! Dashboard and activity queries backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tradeguard_core::AppResult;
use tradeguard_entity::dashboard::{ActivityEntry, StrategyAllocation};

use super::db_error;
use crate::traits::DashboardRepository;

/// Engine events merged with the control audit trail.
const ACTIVITY_UNION: &str = "\
    SELECT id, client_id, kind, summary, metadata, occurred_at \
      FROM activity_events WHERE client_id = $1 \
    UNION ALL \
    SELECT id, client_id, 'control.' || action AS kind, \
           action || ' by ' || actor AS summary, metadata, created_at AS occurred_at \
      FROM control_audit_log WHERE client_id = $1";

/// Read-only repository over strategies and activity.
#[derive(Debug, Clone)]
pub struct PgDashboardRepository {
    pool: PgPool,
}

impl PgDashboardRepository {
    /// Create a new dashboard repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardRepository for PgDashboardRepository {
    async fn list_strategies(&self, client_id: &str) -> AppResult<Vec<StrategyAllocation>> {
        sqlx::query_as::<_, StrategyAllocation>(
            "SELECT * FROM strategy_allocations WHERE client_id = $1 ORDER BY name ASC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list strategies"))
    }

    async fn list_activity(
        &self,
        client_id: &str,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>> {
        let sql = format!(
            "SELECT * FROM ({ACTIVITY_UNION}) AS activity \
             WHERE ($2::timestamptz IS NULL OR occurred_at < $2) \
             ORDER BY occurred_at DESC LIMIT $3"
        );
        sqlx::query_as::<_, ActivityEntry>(&sql)
            .bind(client_id)
            .bind(before)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list activity"))
    }

    async fn activity_since(
        &self,
        client_id: &str,
        after: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>> {
        let sql = format!(
            "SELECT * FROM ({ACTIVITY_UNION}) AS activity \
             WHERE occurred_at > $2 \
             ORDER BY occurred_at ASC LIMIT $3"
        );
        sqlx::query_as::<_, ActivityEntry>(&sql)
            .bind(client_id)
            .bind(after)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to load new activity"))
    }
}
