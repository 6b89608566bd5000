//! Device login orchestration: PKCE start, code exchange, step-up MFA,
//! session creation, refresh rotation, and request authentication.

mod types;


use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use tradeguard_core::AppResult;
use tradeguard_core::config::auth::AuthConfig;
use tradeguard_core::error::ControlPlaneError;
use tradeguard_database::SessionStore;
use tradeguard_entity::auth::{AuthorizationState, MfaChallenge};
use tradeguard_entity::session::{
    AccessTokenPayload, CreateDeviceSession, DeviceRegistration, SessionTokens,
};

use crate::jwt::TokenCodec;
use crate::pkce;
use crate::provider::{AuthorizationRequest, IdentityProvider, ProviderGrant, ProviderIdentity};
use crate::redirect::RedirectPolicy;
use crate::secret::{generate_refresh_token, hash_refresh_token};

pub use types::{
    AuthRejection, AuthenticatedContext, ExchangeCode, ExchangeOutcome, PkceStarted,
    SessionResponse, SessionUser, StartPkce,
};

/// Accepted one-time code lengths.
const OTP_LENGTHS: std::ops::RangeInclusive<usize> = 6..=8;

/// Orchestrates the device login protocol and owns every session write.
#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn IdentityProvider>,
    redirect_policy: RedirectPolicy,
    mfa_methods: Vec<String>,
    config: AuthConfig,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .field("redirect_policy", &self.redirect_policy)
            .field("mfa_methods", &self.mfa_methods)
            .finish()
    }
}

impl AuthService {
    /// Creates the service with its collaborators.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn IdentityProvider>,
        config: AuthConfig,
        mfa_methods: Vec<String>,
    ) -> Self {
        Self {
            codec,
            store,
            provider,
            redirect_policy: RedirectPolicy::new(&config),
            mfa_methods,
            config,
        }
    }

    fn state_window(&self) -> Duration {
        Duration::seconds(self.config.authorization_state_ttl_seconds as i64)
    }

    fn challenge_window(&self) -> Duration {
        Duration::seconds(self.config.mfa_challenge_ttl_seconds as i64)
    }

    fn refresh_ttl(&self) -> Duration {
        Duration::days(self.config.refresh_token_ttl_days as i64)
    }

    /// Starts a PKCE login.
    ///
    /// 1. Check the redirect URI against the policy
    /// 2. Check the code challenge
    /// 3. Build the provider URL around a fresh state
    /// 4. Persist the state with its validity window
    pub async fn start_pkce(&self, request: StartPkce) -> AppResult<PkceStarted> {
        // Step 1: Redirect policy
        self.redirect_policy.check(&request.redirect_uri)?;

        // Step 2: Challenge shape
        pkce::validate_code_challenge(
            &request.code_challenge,
            self.config.min_code_challenge_length,
        )?;

        // Step 3: Authorization URL
        let scope = request
            .scope
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.config.default_scope.clone());
        let state = pkce::generate_state();
        let authorization_url = self.provider.authorization_url(&AuthorizationRequest {
            state: &state,
            code_challenge: &request.code_challenge,
            redirect_uri: &request.redirect_uri,
            scope: &scope,
        })?;

        // Step 4: Persist
        let now = Utc::now();
        let expires_at = now + self.state_window();
        self.store
            .create_authorization_state(&AuthorizationState {
                state: state.clone(),
                code_challenge: request.code_challenge,
                redirect_uri: request.redirect_uri,
                device_id: non_empty(request.device_id),
                scope,
                created_at: now,
                expires_at,
            })
            .await?;

        info!(expires_at = %expires_at, "PKCE login started");

        Ok(PkceStarted {
            state,
            authorization_url,
            expires_at,
        })
    }

    /// Exchanges an authorization code.
    ///
    /// 1. Load the state; reject unknown or expired values
    /// 2. Reject a redirect URI differing from the recorded one
    /// 3. Verify the PKCE verifier locally
    /// 4. Exchange with the provider
    /// 5. Consume the state and either raise a challenge or create a session
    pub async fn exchange_code(&self, request: ExchangeCode) -> AppResult<ExchangeOutcome> {
        let now = Utc::now();

        // Step 1: State
        let stored = self
            .store
            .find_authorization_state(&request.state)
            .await?
            .ok_or(ControlPlaneError::InvalidState)?;
        if stored.is_expired(now, self.state_window()) {
            self.discard_state(&stored.state).await;
            return Err(ControlPlaneError::InvalidState);
        }

        // Step 2: Anti-fixation
        if stored.redirect_uri != request.redirect_uri {
            warn!("Code exchange with mismatched redirect URI");
            return Err(ControlPlaneError::RedirectMismatch);
        }

        // Step 3: Verifier
        if !pkce::verifier_matches(&request.code_verifier, &stored.code_challenge) {
            return Err(ControlPlaneError::InvalidCodeVerifier);
        }

        // Step 4: Provider
        let grant = self
            .provider
            .exchange_code(&request.code, &request.code_verifier, &request.redirect_uri)
            .await?;

        // Step 5: Consume
        let consumed = self
            .store
            .take_authorization_state(&stored.state)
            .await?
            .ok_or(ControlPlaneError::InvalidState)?;
        let device_id = non_empty(request.device_id).or(consumed.device_id);

        match grant {
            ProviderGrant::MfaRequired { mfa_token } => {
                let challenge = MfaChallenge {
                    challenge_id: Uuid::new_v4(),
                    mfa_token,
                    state: consumed.state,
                    device_id,
                    methods: self.mfa_methods.clone(),
                    created_at: now,
                    expires_at: now + self.challenge_window(),
                };
                self.store.create_mfa_challenge(&challenge).await?;

                info!(challenge_id = %challenge.challenge_id, "Step-up authentication required");

                Ok(ExchangeOutcome::MfaRequired {
                    challenge_id: challenge.challenge_id,
                    methods: challenge.methods,
                })
            }
            ProviderGrant::Authenticated(identity) => {
                let session = self.create_session(identity, device_id).await?;
                Ok(ExchangeOutcome::Session(Box::new(session)))
            }
        }
    }

    /// Completes a step-up challenge with a one-time code.
    ///
    /// 1. Load the challenge; reject unknown or expired ones
    /// 2. Reject implausible codes before calling the provider
    /// 3. Verify with the provider
    /// 4. Consume the challenge and create a session
    pub async fn verify_mfa(
        &self,
        challenge_id: &str,
        otp: &str,
        device_id: Option<String>,
    ) -> AppResult<SessionResponse> {
        let now = Utc::now();

        // Step 1: Challenge
        let challenge_id =
            Uuid::parse_str(challenge_id).map_err(|_| ControlPlaneError::UnknownMfaChallenge)?;
        let challenge = self
            .store
            .find_mfa_challenge(challenge_id)
            .await?
            .ok_or(ControlPlaneError::UnknownMfaChallenge)?;
        if challenge.is_expired(now, self.challenge_window()) {
            self.discard_challenge(challenge_id).await;
            return Err(ControlPlaneError::UnknownMfaChallenge);
        }

        // Step 2: Code shape
        let otp = otp.trim();
        if !OTP_LENGTHS.contains(&otp.len()) || !otp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ControlPlaneError::InvalidMfaCode);
        }

        // Step 3: Provider
        let identity = self.provider.verify_otp(&challenge.mfa_token, otp).await?;

        // Step 4: Consume
        let consumed = self
            .store
            .take_mfa_challenge(challenge_id)
            .await?
            .ok_or(ControlPlaneError::UnknownMfaChallenge)?;
        let device_id = non_empty(device_id).or(consumed.device_id);

        self.create_session(identity, device_id).await
    }

    /// Rotates a refresh token.
    ///
    /// 1. Look the session up by the token's hash
    /// 2. Enforce the absolute lifetime measured from login
    /// 3. Swap in a new hash; a lost race means the token was already used
    /// 4. Issue a new access token from the stored session
    pub async fn refresh_session(&self, refresh_token: &str) -> AppResult<SessionTokens> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(ControlPlaneError::InvalidRefreshToken);
        }
        let now = Utc::now();

        // Step 1: Lookup by hash
        let old_hash = hash_refresh_token(refresh_token);
        let mut session = self
            .store
            .find_session_by_refresh_hash(&old_hash)
            .await?
            .ok_or(ControlPlaneError::SessionNotFound)?;

        // Step 2: Absolute TTL
        if session.refresh_expired(now, self.refresh_ttl()) {
            info!(session_id = %session.session_id, "Refresh lifetime exhausted; revoking session");
            if let Err(e) = self.store.delete_session(session.session_id).await {
                warn!(session_id = %session.session_id, error = %e, "Failed to delete expired session");
            }
            return Err(ControlPlaneError::RefreshTokenExpired);
        }

        // Step 3: Compare-and-swap
        let new_refresh_token = generate_refresh_token();
        let new_hash = hash_refresh_token(&new_refresh_token);
        let expires_at = now + self.codec.access_ttl();
        let rotated = self
            .store
            .rotate_refresh_token(session.session_id, &old_hash, &new_hash, expires_at)
            .await?;
        if !rotated {
            warn!(session_id = %session.session_id, "Concurrent refresh lost the rotation race");
            return Err(ControlPlaneError::SessionNotFound);
        }

        // Step 4: New access token
        session.access_token_expires_at = expires_at;
        let access_token = self.codec.issue(&session, now, expires_at)?;

        info!(session_id = %session.session_id, "Refresh token rotated");

        Ok(SessionTokens {
            access_token,
            refresh_token: new_refresh_token,
            expires_at,
        })
    }

    /// Pure token verification (signature + expiry).
    pub fn verify_access_token(&self, token: &str) -> AppResult<AccessTokenPayload> {
        self.codec.verify(token)
    }

    /// Verifies a token and binds it to its live session row.
    ///
    /// A session whose device differs from the token's is deleted.
    pub async fn authenticate_token(
        &self,
        token: Option<&str>,
    ) -> Result<AuthenticatedContext, AuthRejection> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthRejection::MissingToken)?;

        let claims = self
            .codec
            .verify(token)
            .map_err(|_| AuthRejection::InvalidToken)?;

        let session = self
            .store
            .find_session(claims.session_id)
            .await
            .map_err(AuthRejection::Store)?
            .ok_or(AuthRejection::SessionRevoked)?;

        if session.device_id != claims.device_id {
            warn!(
                session_id = %session.session_id,
                "Access token presented for a different device; revoking session"
            );
            if let Err(e) = self.store.delete_session(session.session_id).await {
                warn!(session_id = %session.session_id, error = %e, "Failed to revoke session");
            }
            return Err(AuthRejection::SessionRevoked);
        }

        let now = Utc::now();
        if let Err(e) = self.store.touch_session(session.session_id, now).await {
            warn!(session_id = %session.session_id, error = %e, "Failed to record session activity");
        }

        Ok(AuthenticatedContext { claims, session })
    }

    /// [`Self::authenticate_token`] with rejections mapped to `unauthorized`.
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<AuthenticatedContext> {
        self.authenticate_token(token).await.map_err(Into::into)
    }

    /// Binds push details to the caller's session.
    pub async fn register_device(
        &self,
        ctx: &AuthenticatedContext,
        device_id: &str,
        registration: &DeviceRegistration,
    ) -> AppResult<()> {
        if device_id != ctx.device_id() {
            warn!(session_id = %ctx.session_id(), "Device registration for a foreign device");
            return Err(ControlPlaneError::DeviceMismatch);
        }
        self.store
            .register_device(ctx.session_id(), registration)
            .await?;
        info!(
            session_id = %ctx.session_id(),
            platform = ?registration.platform,
            "Device registered"
        );
        Ok(())
    }

    /// Revokes the caller's session.
    pub async fn sign_out(&self, session_id: Uuid) -> AppResult<()> {
        let removed = self.store.delete_session(session_id).await?;
        info!(session_id = %session_id, removed, "Session signed out");
        Ok(())
    }

    /// Deletes expired authorization states and challenges.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.store.purge_expired(now).await
    }

    async fn create_session(
        &self,
        identity: ProviderIdentity,
        device_id: Option<String>,
    ) -> AppResult<SessionResponse> {
        let now = Utc::now();
        let device_id = device_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let refresh_token = generate_refresh_token();
        let expires_at = now + self.codec.access_ttl();

        let session = self
            .store
            .create_session(&CreateDeviceSession {
                session_id: Uuid::new_v4(),
                user_id: identity.sub,
                user_email: identity.email,
                user_name: identity.name,
                plan: identity.plan,
                device_id,
                refresh_token_hash: hash_refresh_token(&refresh_token),
                access_token_expires_at: expires_at,
                roles: identity.roles,
                client_ids: identity.client_ids,
                created_at: now,
            })
            .await?;

        let access_token = self.codec.issue(&session, now, expires_at)?;

        info!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            device_id = %session.device_id,
            tenants = session.client_ids.len(),
            "Device session created"
        );

        Ok(SessionResponse {
            access_token,
            refresh_token,
            expires_at,
            session_id: session.session_id,
            device_id: session.device_id.clone(),
            user: SessionUser::from(&session),
        })
    }

    async fn discard_state(&self, state: &str) {
        if let Err(e) = self.store.take_authorization_state(state).await {
            warn!(error = %e, "Failed to discard expired authorization state");
        }
    }

    async fn discard_challenge(&self, challenge_id: Uuid) {
        if let Err(e) = self.store.take_mfa_challenge(challenge_id).await {
            warn!(challenge_id = %challenge_id, error = %e, "Failed to discard expired MFA challenge");
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
