//! Tenant control flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kill and pause flags of one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TenantControlState {
    /// Tenant identifier.
    pub client_id: String,
    /// Whether the kill switch has been pulled.
    pub kill_switch_active: bool,
    /// When the kill switch was pulled.
    pub kill_requested_at: Option<DateTime<Utc>>,
    /// Actor who pulled it.
    pub kill_requested_by: Option<String>,
    /// Whether all strategies are paused.
    pub paused: bool,
    /// When the pause was requested.
    pub paused_at: Option<DateTime<Utc>>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl TenantControlState {
    /// Flags of a tenant with no recorded control row.
    pub fn inactive(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            kill_switch_active: false,
            kill_requested_at: None,
            kill_requested_by: None,
            paused: false,
            paused_at: None,
            updated_at: Utc::now(),
        }
    }
}
