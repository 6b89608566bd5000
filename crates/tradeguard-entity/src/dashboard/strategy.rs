//! Strategy allocation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One strategy allocated to a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAllocation {
    /// Tenant identifier.
    pub client_id: String,
    /// Strategy identifier.
    pub strategy_id: String,
    /// Display name.
    pub name: String,
    /// Whether the strategy is trading.
    pub enabled: bool,
    /// Capital allocated to the strategy.
    pub allocation: f64,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}
