//! Application state shared across all handlers.

use std::sync::Arc;

use tradeguard_auth::{AuthService, IdentityProvider, TokenCodec};
use tradeguard_core::AppResult;
use tradeguard_core::config::AppConfig;
use tradeguard_database::repositories::{
    PgAuditLog, PgDashboardRepository, PgSessionStore, PgTaskQueue, PgTenantControlRepository,
};
use tradeguard_database::{
    AuditLog, DashboardRepository, DatabasePool, SessionStore, TaskQueue,
    TenantControlRepository,
};
use tradeguard_realtime::{NudgeBus, RealtimeHub};
use tradeguard_service::{
    ControlService, DashboardService, NotificationChannel, NotificationRouter, configured_channels,
};

/// The store implementations the services run on.
#[derive(Clone)]
pub struct Stores {
    /// Authorization states, MFA challenges, device sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Tenant control flags and strategy allocations.
    pub controls: Arc<dyn TenantControlRepository>,
    /// Append-only audit trail.
    pub audit: Arc<dyn AuditLog>,
    /// Downstream task queue.
    pub tasks: Arc<dyn TaskQueue>,
    /// Activity read model.
    pub dashboard: Arc<dyn DashboardRepository>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            sessions: Arc::new(PgSessionStore::new(pool.clone())),
            controls: Arc::new(PgTenantControlRepository::new(pool.clone())),
            audit: Arc::new(PgAuditLog::new(pool.clone())),
            tasks: Arc::new(PgTaskQueue::new(pool.clone())),
            dashboard: Arc::new(PgDashboardRepository::new(pool)),
        }
    }
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Services ─────────────────────────────────────────────
    /// Device login and request authentication
    pub auth: AuthService,
    /// Guarded tenant actions
    pub controls: ControlService,
    /// Dashboard, strategy, and activity reads
    pub dashboard: DashboardService,

    // ── Realtime ─────────────────────────────────────────────
    /// WebSocket hub
    pub realtime: RealtimeHub,
}

impl AppState {
    /// Wire services onto the given stores and identity provider.
    ///
    /// Notification channels are the configured HTTP channels, the
    /// realtime nudge bus, and any `extra_channels` supplied by the caller.
    pub fn assemble(
        config: AppConfig,
        stores: Stores,
        provider: Arc<dyn IdentityProvider>,
        extra_channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> AppResult<Self> {
        let config = Arc::new(config);

        let codec = Arc::new(TokenCodec::new(&config.auth));
        let auth = AuthService::new(
            codec,
            Arc::clone(&stores.sessions),
            provider,
            config.auth.clone(),
            config.identity_provider.mfa_methods.clone(),
        );

        let nudges = Arc::new(NudgeBus::new(config.realtime.nudge_buffer));
        let router = NotificationRouter::new()
            .with_channels(configured_channels(
                &config.notifications,
                Arc::clone(&stores.sessions),
            )?)
            .with_channel(Arc::clone(&nudges) as Arc<dyn NotificationChannel>)
            .with_channels(extra_channels);
        tracing::info!(channels = router.channel_count(), "Notification channels configured");

        let controls = ControlService::new(
            Arc::clone(&stores.controls),
            stores.tasks,
            stores.audit,
            Arc::new(router),
            &config.controls,
        );
        let dashboard = DashboardService::new(stores.controls, stores.dashboard);
        let realtime = RealtimeHub::new(
            auth.clone(),
            dashboard.clone(),
            nudges,
            config.realtime.clone(),
        );

        Ok(Self {
            config,
            auth,
            controls,
            dashboard,
            realtime,
        })
    }
}
