//! # tradeguard-database
//!
//! Store traits for the control plane, their PostgreSQL implementations,
//! connection management, and migrations. The `memory` feature adds
//! process-local stores for tests and single-node development.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod traits;

#[cfg(feature = "memory")]
pub mod memory;

pub use connection::DatabasePool;
pub use traits::{AuditLog, DashboardRepository, SessionStore, TaskQueue, TenantControlRepository};
