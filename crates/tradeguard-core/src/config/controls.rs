//! Guarded-action policy configuration.

use serde::{Deserialize, Serialize};

/// Confirmation policy for guarded control actions.
///
/// The toggles are global; they are read on every dispatch so a config
/// reload takes effect without re-authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    /// Require an MFA token on every guarded action.
    #[serde(default)]
    pub require_mfa: bool,
    /// Require a biometric signature on every guarded action.
    #[serde(default)]
    pub require_biometric: bool,
    /// Queue name used for downstream worker tasks.
    #[serde(default = "default_task_queue")]
    pub task_queue: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            require_mfa: false,
            require_biometric: false,
            task_queue: default_task_queue(),
        }
    }
}

fn default_task_queue() -> String {
    "controls".to_string()
}
