//! Ecosense Backend Server
//!
//! Entry point for the ecosense-backend server with configuration loading,
//! database migrations, and HTTP server startup.

use std::sync::Arc;

use clap::Parser;
use ecosense_auth::Authenticator;
use tokio::net::TcpListener;
use tokio::signal;

use ecosense_backend::state::AppState;
use ecosense_backend::{build_router_with_options, RouterOptions};

mod cli;
mod config_helpers;
mod tracing_setup;

use cli::CliArgs;
use config_helpers::{database_config_from_config, hasher_from_config, parse_bind_address};
use tracing_setup::install_tracing_from_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eprintln!("[STARTUP] Ecosense Backend starting...");
    let args = CliArgs::parse();

    eprintln!("[STARTUP] Loading config from: {:?}", args.config_path);
    let config = load_config(args.config_path.as_deref())?;
    eprintln!("[STARTUP] Config loaded successfully");

    eprintln!("[STARTUP] Initializing tracing...");
    install_tracing_from_config(&config.logging);
    eprintln!("[STARTUP] Tracing initialized");

    eprintln!("[STARTUP] Setting up database...");
    let db_cfg = database_config_from_config(&config)?;
    let db_pool = ecosense_db::create_pool(&db_cfg).await?;
    eprintln!("[STARTUP] Database pool created");
    run_migrations(&db_pool).await?;
    eprintln!("[STARTUP] Database migrations completed");

    tracing::info!(
        db_driver = %config.database.driver,
        db_max_connections = db_cfg.max_connections,
        static_dir = %config.static_files.directory,
        "database and static files configuration"
    );

    let authenticator = Authenticator::new(hasher_from_config(&config.auth));
    let state = Arc::new(AppState::new(db_pool, authenticator));
    eprintln!("[STARTUP] AppState created");

    let options = RouterOptions {
        cors: config.cors.clone(),
        static_dir: config.static_files.directory.clone(),
    };
    let app = build_router_with_options(state.clone(), &options);
    eprintln!("[STARTUP] Router built successfully");

    let addr = parse_bind_address(&config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    eprintln!("[STARTUP] ✓ Server listening on {addr}");
    eprintln!("[STARTUP] ✓ Ready to accept connections!");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let auth = state.authenticator();
    tracing::info!(
        legacy_secrets_migrated = auth.migrated_count(),
        legacy_migration_failures = auth.migration_failures(),
        "server shutdown complete"
    );
    Ok(())
}

/// Load configuration from file or defaults, then validate it.
fn load_config(path: Option<&str>) -> anyhow::Result<ecosense_config::Config> {
    let config = ecosense_config::load_config(path).map_err(|e| {
        eprintln!("failed to load configuration: {e}");
        anyhow::anyhow!(e.to_string())
    })?;
    ecosense_config::validate_config(&config).map_err(|e| {
        eprintln!("invalid configuration: {e}");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(config)
}

/// Apply the schema migrations for the compiled backend.
async fn run_migrations(db_pool: &ecosense_db::DbPool) -> anyhow::Result<()> {
    tracing::info!(driver = config_helpers::COMPILED_DRIVER, "applying database migrations");
    match ecosense_migrations::migrator().run(db_pool).await {
        Ok(()) => {
            tracing::info!("database migrations applied successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!(%e, "failed to apply database migrations");
            Err(anyhow::anyhow!("failed to apply database migrations: {e}"))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("received SIGTERM, shutting down"),
    }
}
