//! Bookswap Server - book exchange and loan marketplace
//!
//! REST API server over PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookswap_server::{
    api,
    config::{AppConfig, LoggingConfig},
    error,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config.logging)?;

    tracing::info!("Starting Bookswap Server v{}", env!("CARGO_PKG_VERSION"));

    error::expose_internal_errors(config.is_development());

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Install the global subscriber described by the logging configuration
fn init_tracing(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookswap_server={},tower_http=debug", config.level).into());
    let json = config.format.eq_ignore_ascii_case("json");
    let registry = tracing_subscriber::registry().with(filter);

    match config.output.as_str() {
        "journald" => {
            let journald = tracing_journald::layer().context("Failed to connect to journald")?;
            registry.with(journald).init();
            Ok(None)
        }
        "file" => {
            let directory = config.directory.as_deref().unwrap_or("logs");
            let appender = tracing_appender::rolling::daily(directory, "bookswap.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if json {
                registry.with(fmt::layer().json().with_writer(writer)).init();
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .init();
            }
            Ok(Some(guard))
        }
        _ => {
            if json {
                registry.with(fmt::layer().json()).init();
            } else {
                registry.with(fmt::layer()).init();
            }
            Ok(None)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
