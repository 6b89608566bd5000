//! Notification channel configuration.

use serde::{Deserialize, Serialize};

/// Outbound notification channels for control events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Operations webhook (Slack/Teams compatible JSON POST).
    #[serde(default)]
    pub ops_webhook_url: Option<String>,
    /// Push gateway endpoint used to reach the tenant's devices.
    #[serde(default)]
    pub push_gateway_url: Option<String>,
    /// HTTP timeout for channel calls.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            ops_webhook_url: None,
            push_gateway_url: None,
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
