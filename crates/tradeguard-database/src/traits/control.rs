//! Tenant control, audit, and task queue traits.

use async_trait::async_trait;

use tradeguard_core::AppResult;
use tradeguard_entity::control::{
    ControlAuditEntry, ControlTask, NewControlAuditEntry, NewControlTask, TenantControlState,
};
use tradeguard_entity::dashboard::StrategyAllocation;

/// Owner of tenant kill/pause flags and strategy allocations.
#[async_trait]
pub trait TenantControlRepository: Send + Sync + 'static {
    /// Current flags; a tenant with no row reports everything inactive.
    async fn get_controls(&self, client_id: &str) -> AppResult<TenantControlState>;

    /// Set the kill flag.
    async fn activate_kill_switch(&self, client_id: &str, actor: &str)
    -> AppResult<TenantControlState>;

    /// Set or clear the pause flag.
    async fn set_paused(&self, client_id: &str, paused: bool) -> AppResult<TenantControlState>;

    /// Flip one strategy's `enabled` flag.
    ///
    /// Returns `None` when the tenant has no allocation for the strategy;
    /// nothing is written in that case.
    async fn set_strategy_enabled(
        &self,
        client_id: &str,
        strategy_id: &str,
        enabled: bool,
    ) -> AppResult<Option<StrategyAllocation>>;
}

/// Append-only control audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync + 'static {
    /// Append an entry.
    async fn append(&self, entry: &NewControlAuditEntry) -> AppResult<ControlAuditEntry>;
}

/// Downstream task queue consumed by the trading workers.
#[async_trait]
pub trait TaskQueue: Send + Sync + 'static {
    /// Enqueue a task.
    async fn enqueue(&self, task: &NewControlTask) -> AppResult<ControlTask>;
}
