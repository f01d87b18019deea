//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → handlers.rs (decode, validate, call repository)
//!     → response.rs (error → status code + envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
