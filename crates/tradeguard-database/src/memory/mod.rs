//! Process-local store implementations.
//!
//! Only suitable for tests and single-node development: state lives in
//! this process and is lost on restart.

pub mod session;
pub mod tenant;

pub use session::MemorySessionStore;
pub use tenant::MemoryTenantStore;
