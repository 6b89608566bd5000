//! Tenant device push channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tradeguard_core::AppResult;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_database::SessionStore;
use tradeguard_entity::control::ControlNotificationPayload;

use super::NotificationChannel;

/// Gateway limit on messages per request.
const MAX_BATCH: usize = 100;

/// Pushes control events to the tenant's other signed-in devices.
///
/// Recipients are the push tokens of every session scoped to the tenant,
/// minus the device that performed the action. Messages go out in
/// Expo-style batches to the configured gateway.
#[derive(Clone)]
pub struct TenantPushChannel {
    client: Client,
    gateway_url: String,
    sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for TenantPushChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantPushChannel")
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    to: &'a str,
    title: &'static str,
    body: String,
    data: &'a ControlNotificationPayload,
    sound: &'static str,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    data: Vec<PushTicket>,
}

#[derive(Debug, Deserialize)]
struct PushTicket {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

impl TenantPushChannel {
    /// Create the channel.
    pub fn new(
        gateway_url: impl Into<String>,
        timeout_seconds: u64,
        sessions: Arc<dyn SessionStore>,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()
            .map_err(|e| ControlPlaneError::configuration(format!("push client: {e}")))?;
        Ok(Self {
            client,
            gateway_url: gateway_url.into(),
            sessions,
        })
    }

    async fn send_batch(&self, messages: &[PushMessage<'_>]) -> AppResult<()> {
        let response = self
            .client
            .post(&self.gateway_url)
            .json(messages)
            .send()
            .await
            .map_err(|e| ControlPlaneError::internal(format!("push gateway request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlPlaneError::internal(format!(
                "push gateway returned {status}"
            )));
        }

        let body: PushResponse = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::internal(format!("push gateway response: {e}")))?;

        // Per-ticket errors are individual devices; the batch still counts.
        let failed = body.data.iter().filter(|t| t.status == "error").count();
        if failed > 0 {
            let first = body
                .data
                .iter()
                .find_map(|t| t.message.as_deref())
                .unwrap_or("unknown");
            warn!(failed, total = body.data.len(), first_error = first, "Push tickets rejected");
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for TenantPushChannel {
    fn name(&self) -> &'static str {
        "tenant_push"
    }

    async fn deliver(&self, payload: &ControlNotificationPayload) -> AppResult<()> {
        let tokens = self
            .sessions
            .find_push_tokens(&payload.client_id, &payload.device_id)
            .await?;
        if tokens.is_empty() {
            debug!(client_id = %payload.client_id, "No other devices to push to");
            return Ok(());
        }

        let body = payload.summary();
        let messages: Vec<PushMessage<'_>> = tokens
            .iter()
            .map(|token| PushMessage {
                to: token,
                title: "TradeGuard",
                body: body.clone(),
                data: payload,
                sound: "default",
            })
            .collect();

        for batch in messages.chunks(MAX_BATCH) {
            self.send_batch(batch).await?;
        }

        info!(
            client_id = %payload.client_id,
            devices = tokens.len(),
            "Tenant devices notified"
        );
        Ok(())
    }
}
