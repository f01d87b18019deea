//! Data model shared by the repository and the HTTP layer.
//!
//! # Types
//! - `User`: the single persisted entity
//! - `UserResponse`: JSON envelope returned by the user endpoints
//! - `HealthCheckResponse`: fixed payload of the health endpoint

pub mod user;

pub use user::{HealthCheckResponse, User, UserResponse};
