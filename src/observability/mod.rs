//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers, repository, middleware produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (pretty, compact or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
