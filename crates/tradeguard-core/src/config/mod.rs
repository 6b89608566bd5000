//! Application configuration schemas.
//!
//! Deserialized from TOML files via the `config` crate, with
//! `TRADEGUARD__SECTION__KEY` environment overrides. Each sub-module
//! represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod controls;
pub mod identity;
pub mod logging;
pub mod notifications;
pub mod realtime;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::{AuthConfig, MIN_TOKEN_SECRET_BYTES};
use self::controls::ControlsConfig;
use self::identity::IdentityProviderConfig;
use self::logging::LoggingConfig;
use self::notifications::NotificationsConfig;
use self::realtime::RealtimeConfig;

use crate::error::ControlPlaneError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Token and PKCE settings.
    pub auth: AuthConfig,
    /// Upstream identity provider.
    pub identity_provider: IdentityProviderConfig,
    /// Guarded-action policy.
    #[serde(default)]
    pub controls: ControlsConfig,
    /// Outbound notification channels.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Run embedded migrations at startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml`, an environment-specific overlay, and
    /// environment variables prefixed with `TRADEGUARD`.
    pub fn load(env: &str) -> Result<Self, ControlPlaneError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TRADEGUARD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.allowed_redirect_uris")
                    .with_list_parse_key("auth.allowed_redirect_schemes")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                ControlPlaneError::configuration(format!("Failed to build config: {e}"))
            })?;

        let app_config: Self = config.try_deserialize().map_err(|e| {
            ControlPlaneError::configuration(format!("Failed to deserialize config: {e}"))
        })?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject settings that would make the service insecure or unusable.
    pub fn validate(&self) -> Result<(), ControlPlaneError> {
        if self.auth.token_secret.len() < MIN_TOKEN_SECRET_BYTES {
            return Err(ControlPlaneError::configuration(format!(
                "auth.token_secret must be at least {MIN_TOKEN_SECRET_BYTES} bytes"
            )));
        }
        if self.identity_provider.issuer.trim().is_empty() {
            return Err(ControlPlaneError::configuration(
                "identity_provider.issuer is required",
            ));
        }
        if self.identity_provider.client_id.trim().is_empty() {
            return Err(ControlPlaneError::configuration(
                "identity_provider.client_id is required",
            ));
        }
        if self.auth.allowed_redirect_uris.is_empty()
            && self.auth.allowed_redirect_schemes.is_empty()
        {
            return Err(ControlPlaneError::configuration(
                "either auth.allowed_redirect_uris or auth.allowed_redirect_schemes must be set",
            ));
        }
        if self.realtime.push_interval_seconds == 0 || self.realtime.heartbeat_interval_seconds == 0
        {
            return Err(ControlPlaneError::configuration(
                "realtime intervals must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
