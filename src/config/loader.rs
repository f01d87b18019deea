//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the port of `listener.bind_address`.
pub const PORT_ENV: &str = "PORT";
/// Overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file without overrides or validation.
pub fn load_config_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the effective configuration: file (or defaults), then process
/// environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => load_config_file(path)?,
        None => ServiceConfig::default(),
    };

    let config = apply_env_overrides(config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides read through `lookup`.
///
/// An unset or empty variable leaves the configured value in place.
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            var: PORT_ENV,
            message: format!("'{}' is not a valid port", port),
        })?;
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }

    if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.database.url = url;
    }

    Ok(config)
}

/// Replace the port of a bind address, keeping its host.
fn with_port(bind_address: &str, port: u16) -> String {
    match bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{}", port),
    }
}
