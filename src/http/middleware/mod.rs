//! HTTP middleware owned by this crate.
//!
//! Generic concerns (request IDs, timeouts, body limits, panics) come from
//! `tower-http` and are wired up in `server.rs`.

pub mod metrics;

pub use self::metrics::track_metrics;
