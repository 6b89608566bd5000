//! Guarded action enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A state-mutating operation issued from a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Halt all trading for the tenant.
    KillSwitch,
    /// Pause every strategy of the tenant.
    PauseAll,
    /// Resume every strategy of the tenant.
    ResumeAll,
    /// Disable one strategy allocation.
    StrategyPause,
    /// Re-enable one strategy allocation.
    StrategyResume,
}

impl ControlAction {
    /// Audit/notification action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KillSwitch => "kill_switch",
            Self::PauseAll => "pause_all",
            Self::ResumeAll => "resume_all",
            Self::StrategyPause => "strategy_pause",
            Self::StrategyResume => "strategy_resume",
        }
    }

    /// Status string returned to the caller once the mutation commits.
    pub fn response_status(&self) -> &'static str {
        match self {
            Self::KillSwitch => "kill_requested",
            Self::PauseAll => "pause_requested",
            Self::ResumeAll => "resume_requested",
            Self::StrategyPause => "strategy_paused",
            Self::StrategyResume => "strategy_resumed",
        }
    }

    /// Task type enqueued for downstream workers.
    pub fn task_type(&self) -> &'static str {
        match self {
            Self::KillSwitch => "tenant.shutdown",
            Self::PauseAll => "tenant.pause",
            Self::ResumeAll => "tenant.resume",
            Self::StrategyPause => "strategy.pause",
            Self::StrategyResume => "strategy.resume",
        }
    }

    /// Whether the action always needs a confirm token, regardless of policy.
    pub fn requires_confirm_token(&self) -> bool {
        matches!(self, Self::KillSwitch)
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
