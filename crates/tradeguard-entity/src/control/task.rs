//! Downstream worker task entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Initial status of an enqueued task.
pub const TASK_STATUS_PENDING: &str = "pending";

/// A task handed to the trading workers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ControlTask {
    /// Unique task identifier.
    pub id: Uuid,
    /// Queue name.
    pub queue: String,
    /// Task type (e.g. `"tenant.shutdown"`).
    pub task_type: String,
    /// Tenant the task applies to.
    pub client_id: String,
    /// Task payload (JSON).
    pub payload: serde_json::Value,
    /// Worker-managed status.
    pub status: String,
    /// When the task was enqueued.
    pub created_at: DateTime<Utc>,
}

/// Data required to enqueue a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewControlTask {
    /// Queue name.
    pub queue: String,
    /// Task type.
    pub task_type: String,
    /// Tenant.
    pub client_id: String,
    /// Payload.
    pub payload: serde_json::Value,
}
