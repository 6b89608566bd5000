//! PostgreSQL implementations of the store traits.

pub mod audit;
pub mod control;
pub mod dashboard;
pub mod session;
pub mod task;

pub use audit::PgAuditLog;
pub use control::PgTenantControlRepository;
pub use dashboard::PgDashboardRepository;
pub use session::PgSessionStore;
pub use task::PgTaskQueue;

use tradeguard_core::error::ControlPlaneError;

/// Map a sqlx failure to a storage error carrying `context`.
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> ControlPlaneError {
    move |e| ControlPlaneError::database(format!("{context}: {e}"))
}
