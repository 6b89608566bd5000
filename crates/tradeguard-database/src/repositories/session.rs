//! Session store backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tradeguard_core::AppResult;
use tradeguard_entity::auth::{AuthorizationState, MfaChallenge};
use tradeguard_entity::session::{CreateDeviceSession, DeviceRegistration, DeviceSession};

use super::db_error;
use crate::traits::SessionStore;

/// Session, authorization-state, and MFA-challenge persistence.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create_authorization_state(&self, state: &AuthorizationState) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO authorization_states \
             (state, code_challenge, redirect_uri, device_id, scope, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&state.state)
        .bind(&state.code_challenge)
        .bind(&state.redirect_uri)
        .bind(&state.device_id)
        .bind(&state.scope)
        .bind(state.created_at)
        .bind(state.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create authorization state"))?;
        Ok(())
    }

    async fn find_authorization_state(&self, state: &str) -> AppResult<Option<AuthorizationState>> {
        sqlx::query_as::<_, AuthorizationState>(
            "SELECT * FROM authorization_states WHERE state = $1",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find authorization state"))
    }

    async fn take_authorization_state(&self, state: &str) -> AppResult<Option<AuthorizationState>> {
        sqlx::query_as::<_, AuthorizationState>(
            "DELETE FROM authorization_states WHERE state = $1 RETURNING *",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to consume authorization state"))
    }

    async fn create_mfa_challenge(&self, challenge: &MfaChallenge) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO mfa_challenges \
             (challenge_id, mfa_token, state, device_id, methods, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(challenge.challenge_id)
        .bind(&challenge.mfa_token)
        .bind(&challenge.state)
        .bind(&challenge.device_id)
        .bind(&challenge.methods)
        .bind(challenge.created_at)
        .bind(challenge.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create MFA challenge"))?;
        Ok(())
    }

    async fn find_mfa_challenge(&self, challenge_id: Uuid) -> AppResult<Option<MfaChallenge>> {
        sqlx::query_as::<_, MfaChallenge>("SELECT * FROM mfa_challenges WHERE challenge_id = $1")
            .bind(challenge_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find MFA challenge"))
    }

    async fn take_mfa_challenge(&self, challenge_id: Uuid) -> AppResult<Option<MfaChallenge>> {
        sqlx::query_as::<_, MfaChallenge>(
            "DELETE FROM mfa_challenges WHERE challenge_id = $1 RETURNING *",
        )
        .bind(challenge_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to consume MFA challenge"))
    }

    async fn create_session(&self, session: &CreateDeviceSession) -> AppResult<DeviceSession> {
        sqlx::query_as::<_, DeviceSession>(
            "INSERT INTO device_sessions \
             (session_id, user_id, user_email, user_name, plan, device_id, refresh_token_hash, \
              access_token_expires_at, roles, client_ids, metadata, last_seen_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, '{}'::jsonb, $11, $11) \
             RETURNING *",
        )
        .bind(session.session_id)
        .bind(&session.user_id)
        .bind(&session.user_email)
        .bind(&session.user_name)
        .bind(&session.plan)
        .bind(&session.device_id)
        .bind(&session.refresh_token_hash)
        .bind(session.access_token_expires_at)
        .bind(&session.roles)
        .bind(&session.client_ids)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create device session"))
    }

    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<DeviceSession>> {
        sqlx::query_as::<_, DeviceSession>("SELECT * FROM device_sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find device session"))
    }

    async fn find_session_by_refresh_hash(&self, hash: &str) -> AppResult<Option<DeviceSession>> {
        sqlx::query_as::<_, DeviceSession>(
            "SELECT * FROM device_sessions WHERE refresh_token_hash = $1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find session by refresh token"))
    }

    async fn rotate_refresh_token(
        &self,
        session_id: Uuid,
        old_hash: &str,
        new_hash: &str,
        access_token_expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE device_sessions \
             SET refresh_token_hash = $3, access_token_expires_at = $4, last_seen_at = NOW() \
             WHERE session_id = $1 AND refresh_token_hash = $2",
        )
        .bind(session_id)
        .bind(old_hash)
        .bind(new_hash)
        .bind(access_token_expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to rotate refresh token"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn touch_session(&self, session_id: Uuid, seen_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE device_sessions SET last_seen_at = $2 WHERE session_id = $1")
            .bind(session_id)
            .bind(seen_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update session activity"))?;
        Ok(())
    }

    async fn register_device(
        &self,
        session_id: Uuid,
        registration: &DeviceRegistration,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE device_sessions \
             SET push_token = COALESCE($2, push_token), \
                 platform = COALESCE($3, platform), \
                 app_version = COALESCE($4, app_version), \
                 last_seen_at = NOW() \
             WHERE session_id = $1",
        )
        .bind(session_id)
        .bind(&registration.push_token)
        .bind(&registration.platform)
        .bind(&registration.app_version)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to register device"))?;
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM device_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete device session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_push_tokens(
        &self,
        client_id: &str,
        exclude_device_id: &str,
    ) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT push_token FROM device_sessions \
             WHERE $1 = ANY(client_ids) AND device_id <> $2 AND push_token IS NOT NULL",
        )
        .bind(client_id)
        .bind(exclude_device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list push tokens"))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let states = sqlx::query("DELETE FROM authorization_states WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to purge authorization states"))?;
        let challenges = sqlx::query("DELETE FROM mfa_challenges WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to purge MFA challenges"))?;
        Ok(states.rows_affected() + challenges.rows_affected())
    }
}
