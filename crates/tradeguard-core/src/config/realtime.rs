//! Real-time WebSocket push configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Interval between dashboard/activity pushes.
    #[serde(default = "default_push_interval")]
    pub push_interval_seconds: u64,
    /// Interval between keepalive pings.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Number of activity entries sent right after connecting.
    #[serde(default = "default_initial_limit")]
    pub initial_activity_limit: u32,
    /// Capacity of the in-process tenant nudge channel.
    #[serde(default = "default_nudge_buffer")]
    pub nudge_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            push_interval_seconds: default_push_interval(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            initial_activity_limit: default_initial_limit(),
            nudge_buffer: default_nudge_buffer(),
        }
    }
}

fn default_push_interval() -> u64 {
    10
}

fn default_heartbeat_interval() -> u64 {
    25
}

fn default_initial_limit() -> u32 {
    20
}

fn default_nudge_buffer() -> usize {
    256
}
