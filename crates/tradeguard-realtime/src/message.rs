//! Server-to-device frame definitions.

use serde::Serialize;

use tradeguard_entity::dashboard::{ActivityEntry, DashboardSummary};

/// Frames pushed to the device.
///
/// Serialized as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    /// Fresh dashboard snapshot.
    #[serde(rename = "dashboard.update")]
    DashboardUpdate(DashboardSummary),
    /// Activity entries, newest first.
    #[serde(rename = "activity.append")]
    ActivityAppend(Vec<ActivityEntry>),
}

impl OutboundMessage {
    /// JSON text of the frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
