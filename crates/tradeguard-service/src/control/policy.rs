//! Confirmation requirements for guarded actions.

use serde::Deserialize;

use tradeguard_core::AppResult;
use tradeguard_core::config::controls::ControlsConfig;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_entity::control::ControlAction;

/// Confirmation artifacts submitted with a guarded action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// Explicit "I really mean it" token.
    #[serde(default)]
    pub confirm_token: Option<String>,
    /// Fresh one-time code or step-up token.
    #[serde(default)]
    pub mfa_token: Option<String>,
    /// Device biometric signature.
    #[serde(default)]
    pub biometric_signature: Option<String>,
}

impl Confirmation {
    fn has(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    /// A non-blank confirm token was supplied.
    pub fn has_confirm_token(&self) -> bool {
        Self::has(&self.confirm_token)
    }

    /// A non-blank MFA token was supplied.
    pub fn has_mfa_token(&self) -> bool {
        Self::has(&self.mfa_token)
    }

    /// A non-blank biometric signature was supplied.
    pub fn has_biometric_signature(&self) -> bool {
        Self::has(&self.biometric_signature)
    }

    /// Audit flags; the artifacts themselves are never recorded.
    pub fn audit_flags(&self) -> serde_json::Value {
        serde_json::json!({
            "confirmTokenProvided": self.has_confirm_token(),
            "mfaProvided": self.has_mfa_token(),
            "biometricProvided": self.has_biometric_signature(),
        })
    }
}

/// Decides which artifacts an action needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationPolicy {
    require_mfa: bool,
    require_biometric: bool,
}

impl ConfirmationPolicy {
    /// Policy from the global toggles.
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            require_mfa: config.require_mfa,
            require_biometric: config.require_biometric,
        }
    }

    /// Fails with the first missing artifact.
    ///
    /// The confirm token is checked first, then MFA, then biometrics.
    pub fn check(&self, action: ControlAction, confirmation: &Confirmation) -> AppResult<()> {
        if action.requires_confirm_token() && !confirmation.has_confirm_token() {
            return Err(ControlPlaneError::ConfirmTokenRequired);
        }
        if self.require_mfa && !confirmation.has_mfa_token() {
            return Err(ControlPlaneError::MfaTokenRequired);
        }
        if self.require_biometric && !confirmation.has_biometric_signature() {
            return Err(ControlPlaneError::BiometricSignatureRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(require_mfa: bool, require_biometric: bool) -> ConfirmationPolicy {
        ConfirmationPolicy::new(&ControlsConfig {
            require_mfa,
            require_biometric,
            ..ControlsConfig::default()
        })
    }

    #[test]
    fn test_kill_switch_always_needs_confirm_token() {
        let err = policy(false, false)
            .check(ControlAction::KillSwitch, &Confirmation::default())
            .unwrap_err();
        assert_eq!(err, ControlPlaneError::ConfirmTokenRequired);

        let blank = Confirmation {
            confirm_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(policy(false, false).check(ControlAction::KillSwitch, &blank).is_err());
    }

    #[test]
    fn test_pause_needs_nothing_by_default() {
        assert!(policy(false, false)
            .check(ControlAction::PauseAll, &Confirmation::default())
            .is_ok());
    }

    #[test]
    fn test_forced_mfa_applies_to_every_action() {
        let p = policy(true, false);
        assert_eq!(
            p.check(ControlAction::StrategyPause, &Confirmation::default()),
            Err(ControlPlaneError::MfaTokenRequired)
        );
        let confirmed = Confirmation {
            confirm_token: Some("yes".into()),
            ..Default::default()
        };
        assert_eq!(
            p.check(ControlAction::KillSwitch, &confirmed),
            Err(ControlPlaneError::MfaTokenRequired)
        );
    }

    #[test]
    fn test_biometric_checked_after_mfa() {
        let p = policy(true, true);
        let with_mfa = Confirmation {
            mfa_token: Some("123456".into()),
            ..Default::default()
        };
        assert_eq!(
            p.check(ControlAction::ResumeAll, &with_mfa),
            Err(ControlPlaneError::BiometricSignatureRequired)
        );
    }

    #[test]
    fn test_audit_flags_never_carry_values() {
        let c = Confirmation {
            confirm_token: Some("secret-confirm".into()),
            ..Default::default()
        };
        let flags = c.audit_flags().to_string();
        assert!(!flags.contains("secret-confirm"));
        assert!(flags.contains("\"confirmTokenProvided\":true"));
    }
}
