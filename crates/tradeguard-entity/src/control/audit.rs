//! Control audit entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An append-only record of a guarded action that reached authorization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ControlAuditEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// Tenant acted upon.
    pub client_id: String,
    /// `mobile:<userId>:<deviceId>`.
    pub actor: String,
    /// Action name.
    pub action: String,
    /// Confirmation metadata. Holds booleans, never the raw secrets.
    pub metadata: serde_json::Value,
    /// When the action was recorded.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Data required to append an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewControlAuditEntry {
    /// Tenant acted upon.
    pub client_id: String,
    /// Actor identity.
    pub actor: String,
    /// Action name.
    pub action: String,
    /// Confirmation metadata.
    pub metadata: serde_json::Value,
}
