//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the output format from config
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level when set
//! - JSON format for production, pretty format for development

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default filter directives for a given level.
pub fn default_directives(level: &str) -> String {
    format!("user_service={level},tower_http={level},sqlx=warn")
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        let directives = default_directives("debug");
        assert!(directives.contains("user_service=debug"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
