//! Guarded control actions: kill switch, pause/resume, strategy toggles.

mod policy;


use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use tradeguard_core::AppResult;
use tradeguard_core::config::controls::ControlsConfig;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_database::{AuditLog, TaskQueue, TenantControlRepository};
use tradeguard_entity::control::{
    ControlAction, ControlNotificationPayload, NewControlAuditEntry, NewControlTask,
};

use crate::context::RequestContext;
use crate::notification::NotificationRouter;

pub use policy::{Confirmation, ConfirmationPolicy};

/// Response body of a committed guarded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOutcome {
    /// e.g. `kill_requested`.
    pub status: &'static str,
    /// Set for strategy actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
}

/// Runs guarded actions against tenant state.
#[derive(Clone)]
pub struct ControlService {
    controls: Arc<dyn TenantControlRepository>,
    tasks: Arc<dyn TaskQueue>,
    audit: Arc<dyn AuditLog>,
    notifications: Arc<NotificationRouter>,
    policy: ConfirmationPolicy,
    task_queue: String,
}

impl std::fmt::Debug for ControlService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlService")
            .field("policy", &self.policy)
            .field("task_queue", &self.task_queue)
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl ControlService {
    /// Creates the service.
    pub fn new(
        controls: Arc<dyn TenantControlRepository>,
        tasks: Arc<dyn TaskQueue>,
        audit: Arc<dyn AuditLog>,
        notifications: Arc<NotificationRouter>,
        config: &ControlsConfig,
    ) -> Self {
        Self {
            controls,
            tasks,
            audit,
            notifications,
            policy: ConfirmationPolicy::new(config),
            task_queue: config.task_queue.clone(),
        }
    }

    /// Sets the tenant kill flag and requests a shutdown.
    pub async fn kill_switch(
        &self,
        ctx: &RequestContext,
        confirmation: &Confirmation,
    ) -> AppResult<ControlOutcome> {
        self.execute(ctx, ControlAction::KillSwitch, None, confirmation)
            .await
    }

    /// Pauses every strategy of the tenant.
    pub async fn pause_all(
        &self,
        ctx: &RequestContext,
        confirmation: &Confirmation,
    ) -> AppResult<ControlOutcome> {
        self.execute(ctx, ControlAction::PauseAll, None, confirmation)
            .await
    }

    /// Clears the tenant pause flag.
    pub async fn resume_all(
        &self,
        ctx: &RequestContext,
        confirmation: &Confirmation,
    ) -> AppResult<ControlOutcome> {
        self.execute(ctx, ControlAction::ResumeAll, None, confirmation)
            .await
    }

    /// Disables one strategy allocation.
    pub async fn pause_strategy(
        &self,
        ctx: &RequestContext,
        strategy_id: &str,
        confirmation: &Confirmation,
    ) -> AppResult<ControlOutcome> {
        self.execute(ctx, ControlAction::StrategyPause, Some(strategy_id), confirmation)
            .await
    }

    /// Re-enables one strategy allocation.
    pub async fn resume_strategy(
        &self,
        ctx: &RequestContext,
        strategy_id: &str,
        confirmation: &Confirmation,
    ) -> AppResult<ControlOutcome> {
        self.execute(ctx, ControlAction::StrategyResume, Some(strategy_id), confirmation)
            .await
    }

    /// Runs a guarded action.
    ///
    /// 1. Check confirmation artifacts; nothing is touched on failure
    /// 2. Mutate tenant state; failure here fails the request
    /// 3. Enqueue the downstream task (best effort)
    /// 4. Append the audit entry (best effort)
    /// 5. Fire the notification fan-out without waiting
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        action: ControlAction,
        strategy_id: Option<&str>,
        confirmation: &Confirmation,
    ) -> AppResult<ControlOutcome> {
        let strategy_id = match strategy_id.map(str::trim) {
            Some("") => return Err(ControlPlaneError::invalid_request("strategyId is required")),
            other => other.map(str::to_string),
        };

        // Step 1: Confirmation
        if let Err(e) = self.policy.check(action, confirmation) {
            info!(
                client_id = %ctx.client_id,
                action = %action,
                code = e.code(),
                "Guarded action rejected before mutation"
            );
            return Err(e);
        }

        let actor = ctx.actor();

        // Step 2: State
        self.mutate(ctx, action, strategy_id.as_deref(), &actor)
            .await?;

        info!(
            client_id = %ctx.client_id,
            action = %action,
            strategy_id = ?strategy_id,
            session_id = %ctx.session_id,
            "Guarded action committed"
        );

        // Step 3: Downstream task
        let task_enqueued = self
            .enqueue(ctx, action, strategy_id.as_deref(), &actor)
            .await;

        // Step 4: Audit
        let mut metadata = confirmation.audit_flags();
        if let Value::Object(map) = &mut metadata {
            map.insert("deviceId".into(), json!(ctx.device_id));
            map.insert("sessionId".into(), json!(ctx.session_id));
            map.insert("taskEnqueued".into(), json!(task_enqueued));
            if let Some(strategy_id) = &strategy_id {
                map.insert("strategyId".into(), json!(strategy_id));
            }
        }
        let entry = NewControlAuditEntry {
            client_id: ctx.client_id.clone(),
            actor: actor.clone(),
            action: action.as_str().to_string(),
            metadata: metadata.clone(),
        };
        if let Err(e) = self.audit.append(&entry).await {
            warn!(client_id = %ctx.client_id, action = %action, error = %e, "Failed to append control audit entry");
        }

        // Step 5: Notify
        self.notifications
            .dispatch_detached(ControlNotificationPayload {
                client_id: ctx.client_id.clone(),
                action,
                actor,
                device_id: ctx.device_id.clone(),
                strategy_id: strategy_id.clone(),
                metadata,
            });

        Ok(ControlOutcome {
            status: action.response_status(),
            strategy_id,
        })
    }

    async fn mutate(
        &self,
        ctx: &RequestContext,
        action: ControlAction,
        strategy_id: Option<&str>,
        actor: &str,
    ) -> AppResult<()> {
        let client_id = ctx.client_id.as_str();
        match action {
            ControlAction::KillSwitch => {
                self.controls.activate_kill_switch(client_id, actor).await?;
            }
            ControlAction::PauseAll => {
                self.controls.set_paused(client_id, true).await?;
            }
            ControlAction::ResumeAll => {
                self.controls.set_paused(client_id, false).await?;
            }
            ControlAction::StrategyPause | ControlAction::StrategyResume => {
                let strategy_id = strategy_id
                    .ok_or_else(|| ControlPlaneError::invalid_request("strategyId is required"))?;
                let enabled = action == ControlAction::StrategyResume;
                self.controls
                    .set_strategy_enabled(client_id, strategy_id, enabled)
                    .await?
                    .ok_or(ControlPlaneError::StrategyAllocationNotFound)?;
            }
        }
        Ok(())
    }

    async fn enqueue(
        &self,
        ctx: &RequestContext,
        action: ControlAction,
        strategy_id: Option<&str>,
        actor: &str,
    ) -> bool {
        let task = NewControlTask {
            queue: self.task_queue.clone(),
            task_type: action.task_type().to_string(),
            client_id: ctx.client_id.clone(),
            payload: json!({
                "clientId": ctx.client_id,
                "strategyId": strategy_id,
                "requestedBy": actor,
                "requestedAt": ctx.request_time,
            }),
        };
        match self.tasks.enqueue(&task).await {
            Ok(task) => {
                info!(task_id = %task.id, task_type = %task.task_type, "Control task enqueued");
                true
            }
            Err(e) => {
                warn!(
                    client_id = %ctx.client_id,
                    action = %action,
                    error = %e,
                    "Failed to enqueue control task; state change stands"
                );
                false
            }
        }
    }
}
