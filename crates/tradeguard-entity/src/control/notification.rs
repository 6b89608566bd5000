//! Control notification payload.

use serde::{Deserialize, Serialize};

use super::action::ControlAction;

/// Ephemeral event handed to the notification router after a guarded
/// action commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlNotificationPayload {
    /// Tenant acted upon.
    pub client_id: String,
    /// Action performed.
    pub action: ControlAction,
    /// Actor identity.
    pub actor: String,
    /// Device that issued the action.
    pub device_id: String,
    /// Strategy, for per-strategy actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    /// Confirmation metadata.
    pub metadata: serde_json::Value,
}

impl ControlNotificationPayload {
    /// One-line human summary for chat-style channels.
    pub fn summary(&self) -> String {
        match &self.strategy_id {
            Some(strategy_id) => format!(
                "[{}] {} on strategy {} by {}",
                self.client_id, self.action, strategy_id, self.actor
            ),
            None => format!("[{}] {} by {}", self.client_id, self.action, self.actor),
        }
    }
}
