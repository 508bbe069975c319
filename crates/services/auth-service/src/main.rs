//! Auth Service - HTTP server for registration and login.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_service_lib::config::{database_from_env, AuthServiceConfig};
use auth_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "auth-service")]
#[command(about = "Authentication microservice")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Overrides AUTH_SERVICE_HOST
        #[arg(long)]
        host: Option<String>,
        /// Overrides AUTH_SERVICE_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Manage the database schema
    Migrate {
        #[arg(value_enum)]
        action: MigrateAction,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = AuthServiceConfig::from_env()?;
            if let Some(host) = host {
                config.service.host = host;
            }
            if let Some(port) = port {
                config.service.port = port;
            }
            auth_service_lib::run_server(config).await?;
        }
        Commands::Migrate { action } => {
            auth_service_lib::run_migrations(&database_from_env(), action).await?;
        }
    }

    Ok(())
}
