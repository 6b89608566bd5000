//! Read models served to dashboards and the realtime hub.

pub mod activity;
pub mod strategy;
pub mod summary;

pub use activity::{ActivityEntry, ActivityPage};
pub use strategy::StrategyAllocation;
pub use summary::DashboardSummary;
