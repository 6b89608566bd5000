//! Control audit log backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use tradeguard_core::AppResult;
use tradeguard_entity::control::{ControlAuditEntry, NewControlAuditEntry};

use super::db_error;
use crate::traits::AuditLog;

/// Append-only writer for `control_audit_log`.
#[derive(Debug, Clone)]
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    /// Create a new audit log writer.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn append(&self, entry: &NewControlAuditEntry) -> AppResult<ControlAuditEntry> {
        sqlx::query_as::<_, ControlAuditEntry>(
            "INSERT INTO control_audit_log (id, client_id, actor, action, metadata, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&entry.client_id)
        .bind(&entry.actor)
        .bind(&entry.action)
        .bind(&entry.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to append audit entry"))
    }
}
