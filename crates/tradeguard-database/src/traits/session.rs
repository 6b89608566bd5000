//! Session store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tradeguard_core::AppResult;
use tradeguard_entity::auth::{AuthorizationState, MfaChallenge};
use tradeguard_entity::session::{CreateDeviceSession, DeviceRegistration, DeviceSession};

/// Durable store for login artifacts and device sessions.
///
/// Authorization states and MFA challenges live next to sessions so a
/// login started on one instance can complete on another. Sessions are
/// addressed by id, except for the refresh lookup which goes by hash so a
/// superseded token simply has no matching row.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Persist a new authorization state.
    async fn create_authorization_state(&self, state: &AuthorizationState) -> AppResult<()>;

    /// Read an authorization state without consuming it.
    async fn find_authorization_state(&self, state: &str) -> AppResult<Option<AuthorizationState>>;

    /// Atomically delete and return an authorization state.
    ///
    /// Of several concurrent callers, at most one receives `Some`.
    async fn take_authorization_state(&self, state: &str) -> AppResult<Option<AuthorizationState>>;

    /// Persist a new MFA challenge.
    async fn create_mfa_challenge(&self, challenge: &MfaChallenge) -> AppResult<()>;

    /// Read an MFA challenge without consuming it.
    async fn find_mfa_challenge(&self, challenge_id: Uuid) -> AppResult<Option<MfaChallenge>>;

    /// Atomically delete and return an MFA challenge.
    async fn take_mfa_challenge(&self, challenge_id: Uuid) -> AppResult<Option<MfaChallenge>>;

    /// Insert a new device session.
    async fn create_session(&self, session: &CreateDeviceSession) -> AppResult<DeviceSession>;

    /// Find a session by id.
    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<DeviceSession>>;

    /// Find the session whose current refresh token hashes to `hash`.
    async fn find_session_by_refresh_hash(&self, hash: &str) -> AppResult<Option<DeviceSession>>;

    /// Compare-and-swap the refresh hash.
    ///
    /// Returns `false` when the row no longer carries `old_hash`, i.e. a
    /// concurrent refresh already rotated it.
    async fn rotate_refresh_token(
        &self,
        session_id: Uuid,
        old_hash: &str,
        new_hash: &str,
        access_token_expires_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Record activity on a session.
    async fn touch_session(&self, session_id: Uuid, seen_at: DateTime<Utc>) -> AppResult<()>;

    /// Bind push details to a session.
    async fn register_device(
        &self,
        session_id: Uuid,
        registration: &DeviceRegistration,
    ) -> AppResult<()>;

    /// Delete a session. Returns whether a row was removed.
    async fn delete_session(&self, session_id: Uuid) -> AppResult<bool>;

    /// Push tokens of sessions scoped to `client_id`, excluding one device.
    async fn find_push_tokens(
        &self,
        client_id: &str,
        exclude_device_id: &str,
    ) -> AppResult<Vec<String>>;

    /// Delete authorization states and MFA challenges past their expiry.
    ///
    /// Returns the number of rows removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
