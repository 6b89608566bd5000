//! Activity feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One entry of a tenant's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Tenant identifier.
    pub client_id: String,
    /// Entry kind (e.g. `"trade.filled"`, `"control.kill_switch"`).
    pub kind: String,
    /// Human-readable summary.
    pub summary: String,
    /// Entry details (JSON).
    pub metadata: serde_json::Value,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
}

/// A page of activity, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPage {
    /// Entries strictly older than the requested cursor.
    pub items: Vec<ActivityEntry>,
    /// Cursor for the next page, absent on the last page.
    pub next_cursor: Option<DateTime<Utc>>,
}

impl ActivityPage {
    /// Build a page; a full page carries the oldest timestamp as next cursor.
    pub fn from_items(items: Vec<ActivityEntry>, limit: usize) -> Self {
        let next_cursor = if items.len() >= limit {
            items.last().map(|entry| entry.occurred_at)
        } else {
            None
        };
        Self { items, next_cursor }
    }
}
