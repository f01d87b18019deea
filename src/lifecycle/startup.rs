//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the database pool
//! - Initialize the users table
//! - Bind the listener and hand everything to the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::repository::{sqlite, RepositoryError, SqliteUserRepository, UserRepository};

/// Fatal errors while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open database '{url}': {source}")]
    Database {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Schema(#[from] RepositoryError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A fully initialized service, ready to accept traffic.
pub struct Application {
    server: HttpServer,
    listener: TcpListener,
    pool: SqlitePool,
}

impl Application {
    /// Open the database, ensure the schema and bind the listener.
    pub async fn build(config: ServiceConfig) -> Result<Self, StartupError> {
        let pool = sqlite::connect(&config.database)
            .await
            .map_err(|source| StartupError::Database {
                url: config.database.url.clone(),
                source,
            })?;

        let repository = SqliteUserRepository::new(pool.clone());
        repository.init_table().await?;
        tracing::info!("Users table ready");

        let listener = TcpListener::bind(config.listener.bind_address.as_str())
            .await
            .map_err(|source| StartupError::Bind {
                address: config.listener.bind_address.clone(),
                source,
            })?;

        let server = HttpServer::new(config, Arc::new(repository));

        Ok(Self {
            server,
            listener,
            pool,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` fires, then close the pool.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let result = self.server.run(self.listener, shutdown).await;

        self.pool.close().await;
        tracing::info!("Database pool closed");

        result.map_err(StartupError::Serve)
    }
}
