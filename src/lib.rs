//! User Service Library
//!
//! A small JSON-over-HTTP service for creating and fetching users, backed
//! by SQLite.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod repository;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{Application, Shutdown};
pub use model::{User, UserResponse};
pub use repository::{RepositoryError, UserRepository};
