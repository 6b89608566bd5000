//! Concurrent notification fan-out.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use tradeguard_entity::control::ControlNotificationPayload;

use super::NotificationChannel;

/// Routes a control event to every registered channel at once.
#[derive(Clone, Default)]
pub struct NotificationRouter {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl std::fmt::Debug for NotificationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.channels.iter().map(|c| c.name()).collect();
        f.debug_struct("NotificationRouter")
            .field("channels", &names)
            .finish()
    }
}

impl NotificationRouter {
    /// Create a router with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel.
    pub fn with_channel(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Register several channels.
    pub fn with_channels(
        mut self,
        channels: impl IntoIterator<Item = Arc<dyn NotificationChannel>>,
    ) -> Self {
        self.channels.extend(channels);
        self
    }

    /// Number of registered channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Notify every channel concurrently and wait for all of them.
    ///
    /// Returns how many channels accepted the notification. Failures are
    /// logged per channel.
    pub async fn dispatch(&self, payload: &ControlNotificationPayload) -> usize {
        let deliveries = self.channels.iter().map(|channel| async move {
            let result = channel.deliver(payload).await;
            (channel.name(), result)
        });

        let mut delivered = 0;
        for (name, result) in join_all(deliveries).await {
            match result {
                Ok(()) => {
                    delivered += 1;
                    debug!(channel = name, client_id = %payload.client_id, "Notification delivered");
                }
                Err(e) => {
                    warn!(
                        channel = name,
                        client_id = %payload.client_id,
                        action = %payload.action,
                        error = %e,
                        "Notification channel failed"
                    );
                }
            }
        }
        delivered
    }

    /// Dispatch on a background task; the caller never waits.
    pub fn dispatch_detached(self: &Arc<Self>, payload: ControlNotificationPayload) {
        if self.channels.is_empty() {
            return;
        }
        let router = Arc::clone(self);
        tokio::spawn(async move {
            router.dispatch(&payload).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tradeguard_core::AppResult;
    use tradeguard_core::error::ControlPlaneError;
    use tradeguard_entity::control::ControlAction;

    struct CountingChannel {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl NotificationChannel for CountingChannel {
        fn name(&self) -> &'static str {
            if self.fail { "broken" } else { "counting" }
        }

        async fn deliver(&self, _payload: &ControlNotificationPayload) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ControlPlaneError::internal("channel down"));
            }
            Ok(())
        }
    }

    fn payload() -> ControlNotificationPayload {
        ControlNotificationPayload {
            client_id: "acme".into(),
            action: ControlAction::PauseAll,
            actor: "mobile:u:d".into(),
            device_id: "d".into(),
            strategy_id: None,
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_the_others() {
        let healthy = Arc::new(CountingChannel { calls: AtomicUsize::new(0), fail: false });
        let broken = Arc::new(CountingChannel { calls: AtomicUsize::new(0), fail: true });
        let router = NotificationRouter::new()
            .with_channel(broken.clone())
            .with_channel(healthy.clone());

        let delivered = router.dispatch(&payload()).await;

        assert_eq!(delivered, 1);
        assert_eq!(healthy.calls.load(Ordering::SeqCst), 1);
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_router_delivers_nothing() {
        assert_eq!(NotificationRouter::new().dispatch(&payload()).await, 0);
    }
}
