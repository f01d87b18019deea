//! User Service
//!
//! A JSON API over a single `users` table.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!                     │  middleware  │───▶│   handlers   │───▶│  repository  │───▶ SQLite
//!                     │ id/trace/... │    │ decode/valid │    │ classify err │
//!     ◀────────────── └──────────────┘◀───└──────────────┘◀───└──────────────┘
//!     Client Response
//! ```
//!
//! # Routes
//! - `GET /` health check
//! - `POST /users` create a user
//! - `GET /users/{user_id}` fetch a user

use std::path::PathBuf;

use clap::Parser;

use user_service::config::load_config;
use user_service::lifecycle::{signals, Application, Shutdown};
use user_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "JSON API for creating and fetching users", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("user-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database_url = %config.database.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let app = match Application::build(config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    tracing::info!(address = %app.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    app.run(server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
