//! Dashboard summary read model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::strategy::StrategyAllocation;
use crate::control::TenantControlState;

/// Snapshot pushed as `dashboard.update` and served by
/// `GET /v1/dashboard/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Tenant identifier.
    pub client_id: String,
    /// Kill flag.
    pub kill_switch_active: bool,
    /// Pause flag.
    pub paused: bool,
    /// Number of allocated strategies.
    pub strategies_total: usize,
    /// Number of enabled strategies.
    pub strategies_enabled: usize,
    /// Sum of all allocations.
    pub total_allocation: f64,
    /// When the snapshot was taken.
    pub generated_at: DateTime<Utc>,
}

impl DashboardSummary {
    /// Fold tenant flags and strategy allocations into a snapshot.
    pub fn compose(controls: &TenantControlState, strategies: &[StrategyAllocation]) -> Self {
        Self {
            client_id: controls.client_id.clone(),
            kill_switch_active: controls.kill_switch_active,
            paused: controls.paused,
            strategies_total: strategies.len(),
            strategies_enabled: strategies.iter().filter(|s| s.enabled).count(),
            total_allocation: strategies.iter().map(|s| s.allocation).sum(),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_counts_enabled_strategies() {
        let now = Utc::now();
        let strategies = vec![
            StrategyAllocation {
                client_id: "acme".into(),
                strategy_id: "s1".into(),
                name: "Momentum".into(),
                enabled: true,
                allocation: 1500.0,
                updated_at: now,
            },
            StrategyAllocation {
                client_id: "acme".into(),
                strategy_id: "s2".into(),
                name: "Carry".into(),
                enabled: false,
                allocation: 500.0,
                updated_at: now,
            },
        ];
        let summary = DashboardSummary::compose(&TenantControlState::inactive("acme"), &strategies);
        assert_eq!(summary.strategies_total, 2);
        assert_eq!(summary.strategies_enabled, 1);
        assert!((summary.total_allocation - 2000.0).abs() < f64::EPSILON);
        assert!(!summary.kill_switch_active);
    }
}
