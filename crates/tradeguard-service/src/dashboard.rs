//! Read-only dashboard, strategy, and activity snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tradeguard_core::AppResult;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_database::{DashboardRepository, TenantControlRepository};
use tradeguard_entity::dashboard::{
    ActivityEntry, ActivityPage, DashboardSummary, StrategyAllocation,
};

/// Page size when the client does not ask for one.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 20;

/// Largest page a client may ask for.
pub const MAX_ACTIVITY_LIMIT: u32 = 100;

/// Serves the tenant read models.
#[derive(Clone)]
pub struct DashboardService {
    controls: Arc<dyn TenantControlRepository>,
    dashboard: Arc<dyn DashboardRepository>,
}

impl std::fmt::Debug for DashboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardService").finish_non_exhaustive()
    }
}

impl DashboardService {
    /// Creates the service.
    pub fn new(
        controls: Arc<dyn TenantControlRepository>,
        dashboard: Arc<dyn DashboardRepository>,
    ) -> Self {
        Self {
            controls,
            dashboard,
        }
    }

    /// Control flags plus strategy totals.
    pub async fn summary(&self, client_id: &str) -> AppResult<DashboardSummary> {
        let controls = self.controls.get_controls(client_id).await?;
        let strategies = self.dashboard.list_strategies(client_id).await?;
        Ok(DashboardSummary::compose(&controls, &strategies))
    }

    /// Strategy allocations of the tenant.
    pub async fn strategies(&self, client_id: &str) -> AppResult<Vec<StrategyAllocation>> {
        self.dashboard.list_strategies(client_id).await
    }

    /// One page of activity, newest first, strictly older than `cursor`.
    pub async fn activity(
        &self,
        client_id: &str,
        cursor: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> AppResult<ActivityPage> {
        let limit = clamp_limit(limit);
        let items = self
            .dashboard
            .list_activity(client_id, cursor, limit)
            .await?;
        Ok(ActivityPage::from_items(items, limit as usize))
    }

    /// Entries strictly newer than `after`, oldest first.
    pub async fn activity_since(
        &self,
        client_id: &str,
        after: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>> {
        self.dashboard
            .activity_since(client_id, after, limit.clamp(1, MAX_ACTIVITY_LIMIT))
            .await
    }
}

/// Clamps a requested page size into `1..=100`.
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT)
}

/// Parses an RFC 3339 activity cursor.
pub fn parse_cursor(raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ControlPlaneError::invalid_request("cursor must be an RFC 3339 timestamp")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use uuid::Uuid;

    use tradeguard_database::memory::MemoryTenantStore;

    fn event(minutes_ago: i64) -> ActivityEntry {
        ActivityEntry {
            id: Uuid::new_v4(),
            client_id: "acme".into(),
            kind: "order.filled".into(),
            summary: format!("fill {minutes_ago}m ago"),
            metadata: serde_json::json!({}),
            occurred_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn service(store: &Arc<MemoryTenantStore>) -> DashboardService {
        DashboardService::new(store.clone(), store.clone())
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 100);
        assert_eq!(clamp_limit(Some(35)), 35);
    }

    #[test]
    fn test_cursor_parsing() {
        assert_eq!(parse_cursor(None).unwrap(), None);
        assert_eq!(parse_cursor(Some("")).unwrap(), None);
        assert!(parse_cursor(Some("2025-03-01T10:00:00Z")).unwrap().is_some());
        assert_eq!(
            parse_cursor(Some("yesterday")).unwrap_err().code(),
            "invalid_request"
        );
    }

    #[tokio::test]
    async fn test_activity_pages_walk_backwards() {
        let store = Arc::new(MemoryTenantStore::new());
        for minutes_ago in 1..=5 {
            store.push_event(event(minutes_ago));
        }
        let svc = service(&store);

        let first = svc.activity("acme", None, Some(2)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].summary, "fill 1m ago");
        let cursor = first.next_cursor.expect("more pages");

        let second = svc.activity("acme", Some(cursor), Some(2)).await.unwrap();
        assert_eq!(second.items[0].summary, "fill 3m ago");

        let last = svc
            .activity("acme", second.next_cursor, Some(2))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_summary_for_unknown_tenant_is_inactive() {
        let store = Arc::new(MemoryTenantStore::new());
        let summary = service(&store).summary("acme").await.unwrap();
        assert!(!summary.kill_switch_active);
        assert_eq!(summary.strategies_total, 0);
    }
}
