//! Request context carrying the authenticated device and the tenant it acts on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use tradeguard_auth::AuthenticatedContext;
use tradeguard_core::AppResult;
use tradeguard_core::error::ControlPlaneError;

/// Context for the current authenticated request.
///
/// Built once per request from the verified token and passed into service
/// methods so that every operation knows *who* is acting, from *which*
/// device, and against *which* tenant.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// The current session ID.
    pub session_id: Uuid,
    /// Identity provider subject.
    pub user_id: String,
    /// Device the session is bound to.
    pub device_id: String,
    /// Tenant the request acts on.
    pub client_id: String,
    /// Roles granted at login.
    pub roles: Vec<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Resolves the acting tenant from the token's scope.
    ///
    /// A requested `client_id` must be a member of the scope. Without one
    /// the first tenant in scope is used. An empty scope never resolves.
    pub fn resolve(auth: &AuthenticatedContext, requested: Option<&str>) -> AppResult<Self> {
        let scope = &auth.claims.client_ids;
        let requested = requested.map(str::trim).filter(|c| !c.is_empty());

        let client_id = match requested {
            Some(requested) => scope
                .iter()
                .find(|c| c.as_str() == requested)
                .ok_or(ControlPlaneError::ClientScopeMissing)?,
            None => scope.first().ok_or(ControlPlaneError::ClientScopeMissing)?,
        };

        Ok(Self {
            session_id: auth.session_id(),
            user_id: auth.claims.sub.clone(),
            device_id: auth.claims.device_id.clone(),
            client_id: client_id.clone(),
            roles: auth.claims.roles.clone(),
            request_time: Utc::now(),
        })
    }

    /// Audit actor string, `mobile:<userId>:<deviceId>`.
    pub fn actor(&self) -> String {
        format!("mobile:{}:{}", self.user_id, self.device_id)
    }
}
