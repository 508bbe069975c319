//! Auth Service Library
//!
//! Registers users, authenticates them with email and password, and hands
//! back bearer tokens. Every command and query goes through the decorator
//! pipeline before reaching its handler.

pub mod app;
pub mod config;
pub mod decorator;
pub mod http;
pub mod infra;
pub mod observability;
pub mod repository;
pub mod token;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::ValueEnum;
use tokio_util::sync::CancellationToken;
use tracing::info;

use common::DatabaseConfig;

use crate::app::new_application;
use crate::config::AuthServiceConfig;
use crate::decorator::{FacadeMetrics, MetricsClient, NoopMetrics};
use crate::http::{create_router, AppState};
use crate::infra::Database;
use crate::observability::init_metrics;
use crate::repository::PgUsersRepository;
use crate::token::TokenIssuer;

/// Schema migration actions exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Roll back the last migration
    Down,
    /// List migrations and whether they are applied
    Status,
    /// Drop all tables and re-apply every migration
    Fresh,
}

/// Run the HTTP server until Ctrl+C.
pub async fn run_server(config: AuthServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;

    let prometheus = init_metrics(&config.metrics);
    let metrics: Arc<dyn MetricsClient> = if prometheus.is_some() {
        Arc::new(FacadeMetrics)
    } else {
        Arc::new(NoopMetrics)
    };

    let app = new_application(
        Arc::new(PgUsersRepository::new(db.get_connection())),
        config.hasher()?,
        Arc::new(TokenIssuer::new(config.jwt_secret_bytes())),
        metrics,
        config.token_ttl(),
    );

    let shutdown = CancellationToken::new();
    let state = AppState::new(app, shutdown.clone())
        .with_database(db)
        .with_metrics(prometheus);
    let router = create_router(state, &config.metrics.path);

    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port).parse()?;
    info!("{} listening on {}", config.service.service_name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C and cancel in-flight requests.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}

/// Run a migration action against the configured database.
pub async fn run_migrations(
    database: &DatabaseConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(database).await?;

    let states = db.migrate(action).await?;

    match action {
        MigrateAction::Status => {
            for state in states {
                let mark = if state.applied { "applied" } else { "pending" };
                println!("{:<50} {}", state.name, mark);
            }
        }
        MigrateAction::Up => info!("Migrations applied"),
        MigrateAction::Down => info!("Last migration rolled back"),
        MigrateAction::Fresh => info!("Database reset and migrations re-applied"),
    }

    Ok(())
}
