//! Read-side repository for dashboards and activity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tradeguard_core::AppResult;
use tradeguard_entity::dashboard::{ActivityEntry, StrategyAllocation};

/// Read-only queries backing dashboard snapshots and the activity feed.
///
/// Implementations must be safe to poll concurrently from many realtime
/// connections.
#[async_trait]
pub trait DashboardRepository: Send + Sync + 'static {
    /// Strategy allocations of a tenant, ordered by name.
    async fn list_strategies(&self, client_id: &str) -> AppResult<Vec<StrategyAllocation>>;

    /// Activity newest first, strictly older than `before` when given.
    async fn list_activity(
        &self,
        client_id: &str,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>>;

    /// Activity strictly newer than `after`, oldest first, so a full page
    /// can be continued from its last entry.
    async fn activity_since(
        &self,
        client_id: &str,
        after: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>>;
}
