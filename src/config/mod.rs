//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (PORT / DATABASE_URL overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the service runs with no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DatabaseConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, ServiceConfig,
    TimeoutConfig,
};
