//! TradeGuard Server: mobile control plane for automated trading tenants.
//!
//! Main entry point that loads configuration, initializes logging, connects
//! the database, and hands off to the API server.

use tracing_subscriber::{EnvFilter, fmt};

use tradeguard_core::AppResult;
use tradeguard_core::config::AppConfig;
use tradeguard_core::config::logging::LogFormat;
use tradeguard_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `TRADEGUARD_ENV` overlay, and
/// `TRADEGUARD__*` environment variables.
fn load_configuration() -> AppResult<AppConfig> {
    let env = std::env::var("TRADEGUARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Install the global subscriber: `logging.level` unless `RUST_LOG` is set,
/// JSON lines or pretty output per `logging.format`.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = fmt().with_env_filter(filter).with_target(true);

    match config.logging.format {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting TradeGuard v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection ──────────────────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;
    if !db.health_check().await? {
        tracing::warn!("Database health check did not return the expected row");
    }

    // ── Step 2: Migrations ───────────────────────────────────────
    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        tradeguard_database::migration::run_migrations(db.pool()).await?;
        tracing::info!("Database migrations complete");
    }

    // ── Step 3: Serve until shutdown ─────────────────────────────
    let result = tradeguard_api::run_server(config, &db).await;

    db.close().await;
    result
}
