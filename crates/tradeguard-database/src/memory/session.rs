//! In-memory session store using dashmap.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use tradeguard_core::AppResult;
use tradeguard_entity::auth::{AuthorizationState, MfaChallenge};
use tradeguard_entity::session::{CreateDeviceSession, DeviceRegistration, DeviceSession};

use crate::traits::SessionStore;

/// [`SessionStore`] over concurrent hash maps.
///
/// `take_*` uses `DashMap::remove`, which is atomic per key, and rotation
/// holds the shard lock of the session entry while comparing hashes.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    states: DashMap<String, AuthorizationState>,
    challenges: DashMap<Uuid, MfaChallenge>,
    sessions: DashMap<Uuid, DeviceSession>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a session's creation time.
    pub fn backdate_session(&self, session_id: Uuid, created_at: DateTime<Utc>) {
        if let Some(mut session) = self.sessions.get_mut(&session_id) {
            session.created_at = created_at;
        }
    }

    /// Overwrite an authorization state's creation time.
    pub fn backdate_state(&self, state: &str, created_at: DateTime<Utc>) {
        if let Some(mut row) = self.states.get_mut(state) {
            row.created_at = created_at;
        }
    }

    /// Overwrite an MFA challenge's creation time.
    pub fn backdate_challenge(&self, challenge_id: Uuid, created_at: DateTime<Utc>) {
        if let Some(mut challenge) = self.challenges.get_mut(&challenge_id) {
            challenge.created_at = created_at;
        }
    }

    /// Number of stored sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of pending authorization states.
    pub fn authorization_state_count(&self) -> usize {
        self.states.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_authorization_state(&self, state: &AuthorizationState) -> AppResult<()> {
        self.states.insert(state.state.clone(), state.clone());
        Ok(())
    }

    async fn find_authorization_state(&self, state: &str) -> AppResult<Option<AuthorizationState>> {
        Ok(self.states.get(state).map(|entry| entry.value().clone()))
    }

    async fn take_authorization_state(&self, state: &str) -> AppResult<Option<AuthorizationState>> {
        Ok(self.states.remove(state).map(|(_, value)| value))
    }

    async fn create_mfa_challenge(&self, challenge: &MfaChallenge) -> AppResult<()> {
        self.challenges
            .insert(challenge.challenge_id, challenge.clone());
        Ok(())
    }

    async fn find_mfa_challenge(&self, challenge_id: Uuid) -> AppResult<Option<MfaChallenge>> {
        Ok(self
            .challenges
            .get(&challenge_id)
            .map(|entry| entry.value().clone()))
    }

    async fn take_mfa_challenge(&self, challenge_id: Uuid) -> AppResult<Option<MfaChallenge>> {
        Ok(self.challenges.remove(&challenge_id).map(|(_, value)| value))
    }

    async fn create_session(&self, session: &CreateDeviceSession) -> AppResult<DeviceSession> {
        let row = DeviceSession {
            session_id: session.session_id,
            user_id: session.user_id.clone(),
            user_email: session.user_email.clone(),
            user_name: session.user_name.clone(),
            plan: session.plan.clone(),
            device_id: session.device_id.clone(),
            refresh_token_hash: session.refresh_token_hash.clone(),
            access_token_expires_at: session.access_token_expires_at,
            roles: session.roles.clone(),
            client_ids: session.client_ids.clone(),
            push_token: None,
            platform: None,
            app_version: None,
            metadata: serde_json::json!({}),
            last_seen_at: session.created_at,
            created_at: session.created_at,
        };
        self.sessions.insert(row.session_id, row.clone());
        Ok(row)
    }

    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<DeviceSession>> {
        Ok(self
            .sessions
            .get(&session_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_session_by_refresh_hash(&self, hash: &str) -> AppResult<Option<DeviceSession>> {
        Ok(self
            .sessions
            .iter()
            .find(|entry| entry.refresh_token_hash == hash)
            .map(|entry| entry.value().clone()))
    }

    async fn rotate_refresh_token(
        &self,
        session_id: Uuid,
        old_hash: &str,
        new_hash: &str,
        access_token_expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        match self.sessions.get_mut(&session_id) {
            Some(mut session) if session.refresh_token_hash == old_hash => {
                session.refresh_token_hash = new_hash.to_string();
                session.access_token_expires_at = access_token_expires_at;
                session.last_seen_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn touch_session(&self, session_id: Uuid, seen_at: DateTime<Utc>) -> AppResult<()> {
        if let Some(mut session) = self.sessions.get_mut(&session_id) {
            session.last_seen_at = seen_at;
        }
        Ok(())
    }

    async fn register_device(
        &self,
        session_id: Uuid,
        registration: &DeviceRegistration,
    ) -> AppResult<()> {
        if let Some(mut session) = self.sessions.get_mut(&session_id) {
            if registration.push_token.is_some() {
                session.push_token = registration.push_token.clone();
            }
            if registration.platform.is_some() {
                session.platform = registration.platform.clone();
            }
            if registration.app_version.is_some() {
                session.app_version = registration.app_version.clone();
            }
            session.last_seen_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AppResult<bool> {
        Ok(self.sessions.remove(&session_id).is_some())
    }

    async fn find_push_tokens(
        &self,
        client_id: &str,
        exclude_device_id: &str,
    ) -> AppResult<Vec<String>> {
        let mut tokens: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.has_client(client_id) && entry.device_id != exclude_device_id)
            .filter_map(|entry| entry.push_token.clone())
            .collect();
        tokens.sort();
        tokens.dedup();
        Ok(tokens)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let before = self.states.len() + self.challenges.len();
        self.states.retain(|_, state| state.expires_at > now);
        self.challenges.retain(|_, challenge| challenge.expires_at > now);
        let after = self.states.len() + self.challenges.len();
        Ok((before - after) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn new_session(device_id: &str, hash: &str) -> CreateDeviceSession {
        CreateDeviceSession {
            session_id: Uuid::new_v4(),
            user_id: "auth0|1".into(),
            user_email: None,
            user_name: None,
            plan: None,
            device_id: device_id.into(),
            refresh_token_hash: hash.into(),
            access_token_expires_at: Utc::now() + Duration::minutes(15),
            roles: vec![],
            client_ids: vec!["acme".into()],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_take_authorization_state_is_single_use() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        let state = AuthorizationState {
            state: "abc".into(),
            code_challenge: "c".repeat(43),
            redirect_uri: "app://auth".into(),
            device_id: None,
            scope: "openid".into(),
            created_at: now,
            expires_at: now + Duration::minutes(5),
        };
        store.create_authorization_state(&state).await.unwrap();

        assert!(store.take_authorization_state("abc").await.unwrap().is_some());
        assert!(store.take_authorization_state("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rotate_is_compare_and_swap() {
        let store = MemorySessionStore::new();
        let session = store.create_session(&new_session("d1", "old")).await.unwrap();
        let exp = Utc::now() + Duration::minutes(15);

        assert!(store
            .rotate_refresh_token(session.session_id, "old", "new", exp)
            .await
            .unwrap());
        assert!(!store
            .rotate_refresh_token(session.session_id, "old", "newer", exp)
            .await
            .unwrap());
        assert!(store.find_session_by_refresh_hash("old").await.unwrap().is_none());
        assert!(store.find_session_by_refresh_hash("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_push_tokens_exclude_acting_device() {
        let store = MemorySessionStore::new();
        let a = store.create_session(&new_session("phone-a", "h1")).await.unwrap();
        let b = store.create_session(&new_session("phone-b", "h2")).await.unwrap();
        for (session, token) in [(&a, "tok-a"), (&b, "tok-b")] {
            let registration = DeviceRegistration {
                push_token: Some(token.into()),
                platform: Some("ios".into()),
                app_version: None,
            };
            store
                .register_device(session.session_id, &registration)
                .await
                .unwrap();
        }

        let tokens = store.find_push_tokens("acme", "phone-a").await.unwrap();
        assert_eq!(tokens, vec!["tok-b".to_string()]);
        assert!(store.find_push_tokens("globex", "phone-a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired_rows() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        for (name, expires_at) in [("old", now - Duration::seconds(1)), ("fresh", now + Duration::minutes(5))] {
            store
                .create_authorization_state(&AuthorizationState {
                    state: name.into(),
                    code_challenge: "c".repeat(43),
                    redirect_uri: "app://auth".into(),
                    device_id: None,
                    scope: "openid".into(),
                    created_at: now - Duration::minutes(10),
                    expires_at,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert!(store.find_authorization_state("fresh").await.unwrap().is_some());
    }
}
