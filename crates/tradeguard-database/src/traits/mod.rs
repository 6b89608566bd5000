//! Store seams of the control plane.
//!
//! Each trait has a PostgreSQL implementation in
//! [`crate::repositories`] and, behind the `memory` feature, an
//! in-process implementation in `crate::memory`.

pub mod control;
pub mod dashboard;
pub mod session;

pub use control::{AuditLog, TaskQueue, TenantControlRepository};
pub use dashboard::DashboardRepository;
pub use session::SessionStore;
