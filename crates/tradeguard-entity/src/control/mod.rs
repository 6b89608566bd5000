//! Guarded control entities.

pub mod action;
pub mod audit;
pub mod notification;
pub mod task;
pub mod tenant;

pub use action::ControlAction;
pub use audit::{ControlAuditEntry, NewControlAuditEntry};
pub use notification::ControlNotificationPayload;
pub use task::{ControlTask, NewControlTask, TASK_STATUS_PENDING};
pub use tenant::TenantControlState;
