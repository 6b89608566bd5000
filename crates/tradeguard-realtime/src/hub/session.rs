//! Frame production for one connection.

use chrono::{DateTime, Utc};

use tradeguard_core::AppResult;
use tradeguard_entity::dashboard::ActivityEntry;
use tradeguard_service::DashboardService;
use tradeguard_service::dashboard::MAX_ACTIVITY_LIMIT;

use crate::cursor::ActivityCursor;
use crate::message::OutboundMessage;

/// Per-connection state: the tenant and the activity cursor.
///
/// The cursor only moves after a tick's reads all succeed, so a failed
/// tick is retried in full on the next one.
#[derive(Debug)]
pub struct HubSession {
    client_id: String,
    dashboard: DashboardService,
    cursor: ActivityCursor,
    initial_limit: u32,
}

impl HubSession {
    /// New session. `resume_after` is the newest timestamp the device
    /// already holds from an earlier connection.
    pub fn new(
        client_id: impl Into<String>,
        dashboard: DashboardService,
        initial_limit: u32,
        resume_after: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            dashboard,
            cursor: resume_after
                .map(ActivityCursor::resume_after)
                .unwrap_or_default(),
            initial_limit: initial_limit.clamp(1, MAX_ACTIVITY_LIMIT),
        }
    }

    /// Tenant this connection follows.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Current cursor.
    pub fn cursor(&self) -> ActivityCursor {
        self.cursor
    }

    /// Snapshot plus the most recent activity, sent right after connecting.
    ///
    /// The activity frame is always present, possibly empty.
    pub async fn initial_frames(&mut self) -> AppResult<Vec<OutboundMessage>> {
        let activity = self.fetch_activity(self.initial_limit).await?;
        let summary = self.dashboard.summary(&self.client_id).await?;
        self.cursor.advance(&activity);
        Ok(vec![
            OutboundMessage::DashboardUpdate(summary),
            OutboundMessage::ActivityAppend(activity),
        ])
    }

    /// Snapshot plus activity newer than anything already sent.
    ///
    /// The activity frame is omitted when nothing is new.
    pub async fn tick_frames(&mut self) -> AppResult<Vec<OutboundMessage>> {
        let activity = self.fetch_activity(MAX_ACTIVITY_LIMIT).await?;
        let summary = self.dashboard.summary(&self.client_id).await?;
        self.cursor.advance(&activity);

        let mut frames = vec![OutboundMessage::DashboardUpdate(summary)];
        if !activity.is_empty() {
            frames.push(OutboundMessage::ActivityAppend(activity));
        }
        Ok(frames)
    }

    async fn fetch_activity(&self, limit: u32) -> AppResult<Vec<ActivityEntry>> {
        let entries = match self.cursor.last_sent() {
            Some(after) => self.fetch_since(after).await?,
            None => {
                self.dashboard
                    .activity(&self.client_id, None, Some(limit))
                    .await?
                    .items
            }
        };
        Ok(self.cursor.unseen(entries))
    }

    /// Everything newer than `after`, newest first. Pages forward until a
    /// short page so a burst larger than one page is never skipped.
    async fn fetch_since(&self, mut after: DateTime<Utc>) -> AppResult<Vec<ActivityEntry>> {
        let mut collected = Vec::new();
        loop {
            let page = self
                .dashboard
                .activity_since(&self.client_id, after, MAX_ACTIVITY_LIMIT)
                .await?;
            let full = page.len() >= MAX_ACTIVITY_LIMIT as usize;
            match page.last() {
                Some(last) => after = last.occurred_at,
                None => break,
            }
            collected.extend(page);
            if !full {
                break;
            }
        }
        collected.reverse();
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use chrono::Duration;
    use uuid::Uuid;

    use tradeguard_database::memory::MemoryTenantStore;

    fn entry(label: &str, at: DateTime<Utc>) -> ActivityEntry {
        ActivityEntry {
            id: Uuid::new_v4(),
            client_id: "acme".into(),
            kind: "order.filled".into(),
            summary: label.into(),
            metadata: serde_json::json!({}),
            occurred_at: at,
        }
    }

    fn activity(frames: &[OutboundMessage]) -> Option<Vec<String>> {
        frames.iter().find_map(|f| match f {
            OutboundMessage::ActivityAppend(items) => {
                Some(items.iter().map(|e| e.summary.clone()).collect())
            }
            _ => None,
        })
    }

    fn dashboard(store: &Arc<MemoryTenantStore>) -> DashboardService {
        DashboardService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_initial_push_has_snapshot_and_recent_activity() {
        let store = Arc::new(MemoryTenantStore::new());
        let now = Utc::now();
        store.push_event(entry("e3", now - Duration::minutes(3)));
        store.push_event(entry("e1", now - Duration::minutes(1)));
        store.push_event(entry("e2", now - Duration::minutes(2)));

        let mut session = HubSession::new("acme", dashboard(&store), 20, None);
        let frames = session.initial_frames().await.unwrap();

        assert!(matches!(frames[0], OutboundMessage::DashboardUpdate(_)));
        assert_eq!(activity(&frames).unwrap(), vec!["e1", "e2", "e3"]);
        assert_eq!(
            session.cursor().last_sent(),
            Some(now - Duration::minutes(1))
        );
    }

    #[tokio::test]
    async fn test_tick_sends_only_new_entries() {
        let store = Arc::new(MemoryTenantStore::new());
        let now = Utc::now();
        store.push_event(entry("e1", now - Duration::minutes(1)));

        let mut session = HubSession::new("acme", dashboard(&store), 20, None);
        session.initial_frames().await.unwrap();

        let idle = session.tick_frames().await.unwrap();
        assert_eq!(idle.len(), 1);
        assert!(activity(&idle).is_none());

        store.push_event(entry("e4", now));
        let frames = session.tick_frames().await.unwrap();
        assert_eq!(activity(&frames).unwrap(), vec!["e4"]);

        assert!(activity(&session.tick_frames().await.unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_burst_larger_than_a_page_is_delivered_in_full() {
        let store = Arc::new(MemoryTenantStore::new());
        let base = Utc::now() - Duration::hours(1);
        store.push_event(entry("seed", base));

        let mut session = HubSession::new("acme", dashboard(&store), 20, None);
        session.initial_frames().await.unwrap();

        for i in 1..=150 {
            store.push_event(entry(&format!("n{i}"), base + Duration::seconds(i)));
        }

        let frames = session.tick_frames().await.unwrap();
        let sent = activity(&frames).unwrap();
        assert_eq!(sent.len(), 150);
        assert_eq!(sent.first().map(String::as_str), Some("n150"));
        assert_eq!(sent.last().map(String::as_str), Some("n1"));
        assert_eq!(session.cursor().last_sent(), Some(base + Duration::seconds(150)));

        assert!(activity(&session.tick_frames().await.unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_reconnect_never_resends_seen_entries() {
        let store = Arc::new(MemoryTenantStore::new());
        let now = Utc::now();
        store.push_event(entry("e1", now - Duration::minutes(1)));
        store.push_event(entry("e2", now - Duration::minutes(2)));
        store.push_event(entry("e3", now - Duration::minutes(3)));

        let mut first = HubSession::new("acme", dashboard(&store), 20, None);
        let frames = first.initial_frames().await.unwrap();
        assert_eq!(activity(&frames).unwrap(), vec!["e1", "e2", "e3"]);
        let held = first.cursor().last_sent();
        drop(first);

        let mut second = HubSession::new("acme", dashboard(&store), 20, held);
        let resumed = second.initial_frames().await.unwrap();
        assert_eq!(activity(&resumed).unwrap(), Vec::<String>::new());

        store.push_event(entry("e0", now));
        let frames = second.tick_frames().await.unwrap();
        assert_eq!(activity(&frames).unwrap(), vec!["e0"]);
    }

    #[tokio::test]
    async fn test_control_actions_show_up_as_activity() {
        use tradeguard_database::AuditLog;
        use tradeguard_entity::control::NewControlAuditEntry;

        let store = Arc::new(MemoryTenantStore::new());
        let mut session = HubSession::new("acme", dashboard(&store), 20, None);
        session.initial_frames().await.unwrap();

        store
            .append(&NewControlAuditEntry {
                client_id: "acme".into(),
                actor: "mobile:u:d".into(),
                action: "pause_all".into(),
                metadata: serde_json::json!({}),
            })
            .await
            .unwrap();

        let frames = session.tick_frames().await.unwrap();
        assert_eq!(activity(&frames).unwrap(), vec!["pause_all by mobile:u:d"]);
    }
}
