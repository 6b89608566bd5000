//! Operations webhook channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use tradeguard_core::AppResult;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_entity::control::ControlNotificationPayload;

use super::NotificationChannel;

/// Posts every control event to the operations webhook.
///
/// The body is `{"text": <summary>, "payload": <event>}`, which chat
/// incoming-webhook endpoints render as a plain message.
#[derive(Debug, Clone)]
pub struct OpsWebhookChannel {
    client: Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    text: String,
    payload: &'a ControlNotificationPayload,
}

impl OpsWebhookChannel {
    /// Create the channel for `url`.
    pub fn new(url: impl Into<String>, timeout_seconds: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()
            .map_err(|e| ControlPlaneError::configuration(format!("webhook client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationChannel for OpsWebhookChannel {
    fn name(&self) -> &'static str {
        "ops_webhook"
    }

    async fn deliver(&self, payload: &ControlNotificationPayload) -> AppResult<()> {
        let message = WebhookMessage {
            text: payload.summary(),
            payload,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&message)
            .send()
            .await
            .map_err(|e| ControlPlaneError::internal(format!("ops webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlPlaneError::internal(format!(
                "ops webhook returned {status}"
            )));
        }

        info!(client_id = %payload.client_id, action = %payload.action, "Ops webhook notified");
        Ok(())
    }
}
