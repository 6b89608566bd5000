//! Best-effort fan-out of control events.

pub mod push;
pub mod router;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;

use tradeguard_core::AppResult;
use tradeguard_core::config::notifications::NotificationsConfig;
use tradeguard_database::SessionStore;
use tradeguard_entity::control::ControlNotificationPayload;

pub use push::TenantPushChannel;
pub use router::NotificationRouter;
pub use webhook::OpsWebhookChannel;

/// One destination for control notifications.
///
/// A failing channel never affects the others or the originating action;
/// the router logs the error and moves on.
#[async_trait]
pub trait NotificationChannel: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one notification.
    async fn deliver(&self, payload: &ControlNotificationPayload) -> AppResult<()>;
}

/// Build the HTTP channels enabled in configuration.
pub fn configured_channels(
    config: &NotificationsConfig,
    sessions: Arc<dyn SessionStore>,
) -> AppResult<Vec<Arc<dyn NotificationChannel>>> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();
    if let Some(url) = config.ops_webhook_url.as_deref().filter(|u| !u.is_empty()) {
        channels.push(Arc::new(OpsWebhookChannel::new(
            url,
            config.request_timeout_seconds,
        )?));
    }
    if let Some(url) = config.push_gateway_url.as_deref().filter(|u| !u.is_empty()) {
        channels.push(Arc::new(TenantPushChannel::new(
            url,
            config.request_timeout_seconds,
            sessions,
        )?));
    }
    Ok(channels)
}
