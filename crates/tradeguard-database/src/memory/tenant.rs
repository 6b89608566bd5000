//! In-memory tenant controls, audit trail, task queue, and activity feed.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use tradeguard_core::AppResult;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_entity::control::{
    ControlAuditEntry, ControlTask, NewControlAuditEntry, NewControlTask, TASK_STATUS_PENDING,
    TenantControlState,
};
use tradeguard_entity::dashboard::{ActivityEntry, StrategyAllocation};

use crate::traits::{AuditLog, DashboardRepository, TaskQueue, TenantControlRepository};

/// One process-local stand-in for every tenant-side repository.
///
/// Audit entries are surfaced in the activity feed the same way the
/// PostgreSQL union query does it.
#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    controls: DashMap<String, TenantControlState>,
    strategies: DashMap<(String, String), StrategyAllocation>,
    audit: Mutex<Vec<ControlAuditEntry>>,
    tasks: Mutex<Vec<ControlTask>>,
    events: Mutex<Vec<ActivityEntry>>,
    fail_tasks: AtomicBool,
    fail_audit: AtomicBool,
}

impl MemoryTenantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a strategy allocation.
    pub fn seed_strategy(&self, allocation: StrategyAllocation) {
        self.strategies.insert(
            (allocation.client_id.clone(), allocation.strategy_id.clone()),
            allocation,
        );
    }

    /// Record an engine activity event.
    pub fn push_event(&self, entry: ActivityEntry) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    /// Snapshot of the audit trail, oldest first.
    pub fn audit_entries(&self) -> Vec<ControlAuditEntry> {
        self.audit.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshot of enqueued tasks, oldest first.
    pub fn tasks(&self) -> Vec<ControlTask> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every subsequent `enqueue` fail.
    pub fn fail_task_queue(&self, fail: bool) {
        self.fail_tasks.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `append` fail.
    pub fn fail_audit_log(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    fn merged_activity(&self, client_id: &str) -> Vec<ActivityEntry> {
        let mut merged: Vec<ActivityEntry> = self
            .events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|entry| entry.client_id == client_id)
            .cloned()
            .collect();
        merged.extend(
            self.audit
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .filter(|entry| entry.client_id == client_id)
                .map(|entry| ActivityEntry {
                    id: entry.id,
                    client_id: entry.client_id.clone(),
                    kind: format!("control.{}", entry.action),
                    summary: format!("{} by {}", entry.action, entry.actor),
                    metadata: entry.metadata.clone(),
                    occurred_at: entry.created_at,
                }),
        );
        merged.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        merged
    }
}

#[async_trait]
impl TenantControlRepository for MemoryTenantStore {
    async fn get_controls(&self, client_id: &str) -> AppResult<TenantControlState> {
        Ok(self
            .controls
            .get(client_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| TenantControlState::inactive(client_id)))
    }

    async fn activate_kill_switch(
        &self,
        client_id: &str,
        actor: &str,
    ) -> AppResult<TenantControlState> {
        let now = Utc::now();
        let mut entry = self
            .controls
            .entry(client_id.to_string())
            .or_insert_with(|| TenantControlState::inactive(client_id));
        entry.kill_switch_active = true;
        entry.kill_requested_at = Some(now);
        entry.kill_requested_by = Some(actor.to_string());
        entry.updated_at = now;
        Ok(entry.value().clone())
    }

    async fn set_paused(&self, client_id: &str, paused: bool) -> AppResult<TenantControlState> {
        let now = Utc::now();
        let mut entry = self
            .controls
            .entry(client_id.to_string())
            .or_insert_with(|| TenantControlState::inactive(client_id));
        entry.paused = paused;
        entry.paused_at = paused.then_some(now);
        entry.updated_at = now;
        Ok(entry.value().clone())
    }

    async fn set_strategy_enabled(
        &self,
        client_id: &str,
        strategy_id: &str,
        enabled: bool,
    ) -> AppResult<Option<StrategyAllocation>> {
        let key = (client_id.to_string(), strategy_id.to_string());
        Ok(self.strategies.get_mut(&key).map(|mut allocation| {
            allocation.enabled = enabled;
            allocation.updated_at = Utc::now();
            allocation.value().clone()
        }))
    }
}

#[async_trait]
impl AuditLog for MemoryTenantStore {
    async fn append(&self, entry: &NewControlAuditEntry) -> AppResult<ControlAuditEntry> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(ControlPlaneError::database("audit log unavailable"));
        }
        let row = ControlAuditEntry {
            id: Uuid::now_v7(),
            client_id: entry.client_id.clone(),
            actor: entry.actor.clone(),
            action: entry.action.clone(),
            metadata: entry.metadata.clone(),
            created_at: Utc::now(),
        };
        self.audit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl TaskQueue for MemoryTenantStore {
    async fn enqueue(&self, task: &NewControlTask) -> AppResult<ControlTask> {
        if self.fail_tasks.load(Ordering::SeqCst) {
            return Err(ControlPlaneError::database("task queue unavailable"));
        }
        let row = ControlTask {
            id: Uuid::now_v7(),
            queue: task.queue.clone(),
            task_type: task.task_type.clone(),
            client_id: task.client_id.clone(),
            payload: task.payload.clone(),
            status: TASK_STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        };
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl DashboardRepository for MemoryTenantStore {
    async fn list_strategies(&self, client_id: &str) -> AppResult<Vec<StrategyAllocation>> {
        let mut strategies: Vec<StrategyAllocation> = self
            .strategies
            .iter()
            .filter(|entry| entry.client_id == client_id)
            .map(|entry| entry.value().clone())
            .collect();
        strategies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(strategies)
    }

    async fn list_activity(
        &self,
        client_id: &str,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>> {
        Ok(self
            .merged_activity(client_id)
            .into_iter()
            .filter(|entry| before.is_none_or(|cursor| entry.occurred_at < cursor))
            .take(limit as usize)
            .collect())
    }

    async fn activity_since(
        &self,
        client_id: &str,
        after: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<ActivityEntry>> {
        Ok(self
            .merged_activity(client_id)
            .into_iter()
            .rev()
            .filter(|entry| entry.occurred_at > after)
            .take(limit as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn event(client_id: &str, minutes_ago: i64) -> ActivityEntry {
        ActivityEntry {
            id: Uuid::new_v4(),
            client_id: client_id.into(),
            kind: "trade.filled".into(),
            summary: "BTC-USD buy".into(),
            metadata: serde_json::json!({}),
            occurred_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_not_created() {
        let store = MemoryTenantStore::new();
        let result = store.set_strategy_enabled("acme", "ghost", false).await.unwrap();
        assert!(result.is_none());
        assert!(store.list_strategies("acme").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_activity_ordering_and_cursor_exclusive() {
        let store = MemoryTenantStore::new();
        let old = event("acme", 30);
        let mid = event("acme", 20);
        let new = event("acme", 10);
        for entry in [&mid, &old, &new] {
            store.push_event(entry.clone());
        }
        store.push_event(event("globex", 5));

        let page = store.list_activity("acme", None, 2).await.unwrap();
        assert_eq!(page.iter().map(|e| e.id).collect::<Vec<_>>(), vec![new.id, mid.id]);

        let next = store
            .list_activity("acme", Some(mid.occurred_at), 10)
            .await
            .unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, old.id);

        let since = store.activity_since("acme", mid.occurred_at, 10).await.unwrap();
        assert_eq!(since.len(), 1);
        assert_eq!(since[0].id, new.id);

        let oldest_first = store
            .activity_since("acme", old.occurred_at - Duration::minutes(1), 2)
            .await
            .unwrap();
        assert_eq!(
            oldest_first.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![old.id, mid.id]
        );
    }

    #[tokio::test]
    async fn test_audit_entries_appear_in_activity() {
        let store = MemoryTenantStore::new();
        store
            .append(&NewControlAuditEntry {
                client_id: "acme".into(),
                actor: "mobile:u1:d1".into(),
                action: "pause_all".into(),
                metadata: serde_json::json!({ "mfaProvided": false }),
            })
            .await
            .unwrap();

        let activity = store.list_activity("acme", None, 10).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].kind, "control.pause_all");
    }
}
