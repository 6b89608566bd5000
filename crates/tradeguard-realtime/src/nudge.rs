//! In-process tenant nudges.
//!
//! A guarded action nudges every local connection of its tenant so they
//! push right away. Connections on other instances still converge on
//! their next tick.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::trace;

use tradeguard_core::AppResult;
use tradeguard_entity::control::ControlNotificationPayload;
use tradeguard_service::NotificationChannel;

/// Per-tenant broadcast channels.
#[derive(Debug)]
pub struct NudgeBus {
    tenants: DashMap<String, broadcast::Sender<()>>,
    buffer: usize,
}

impl NudgeBus {
    /// Create a bus whose tenant channels hold `buffer` pending nudges.
    pub fn new(buffer: usize) -> Self {
        Self {
            tenants: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Receive nudges for a tenant.
    pub fn subscribe(&self, client_id: &str) -> broadcast::Receiver<()> {
        self.tenants
            .entry(client_id.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer).0)
            .subscribe()
    }

    /// Wake every local connection of a tenant. Returns how many listened.
    pub fn nudge(&self, client_id: &str) -> usize {
        let listeners = match self.tenants.get(client_id) {
            Some(tx) => tx.send(()).unwrap_or(0),
            None => 0,
        };
        if listeners == 0 {
            self.tenants
                .remove_if(client_id, |_, tx| tx.receiver_count() == 0);
        }
        trace!(client_id, listeners, "Tenant nudged");
        listeners
    }

    /// Tenants with a live channel.
    pub fn tenant_count(&self) -> usize {
        self.tenants.len()
    }
}

#[async_trait]
impl NotificationChannel for NudgeBus {
    fn name(&self) -> &'static str {
        "realtime_nudge"
    }

    async fn deliver(&self, payload: &ControlNotificationPayload) -> AppResult<()> {
        self.nudge(&payload.client_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nudge_reaches_only_that_tenant() {
        let bus = NudgeBus::new(8);
        let mut acme = bus.subscribe("acme");
        let mut globex = bus.subscribe("globex");

        assert_eq!(bus.nudge("acme"), 1);
        assert!(acme.recv().await.is_ok());
        assert!(globex.try_recv().is_err());
    }

    #[test]
    fn test_idle_tenant_channels_are_dropped() {
        let bus = NudgeBus::new(8);
        drop(bus.subscribe("acme"));
        assert_eq!(bus.tenant_count(), 1);

        assert_eq!(bus.nudge("acme"), 0);
        assert_eq!(bus.tenant_count(), 0);
    }
}
