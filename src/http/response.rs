//! Error responses.
//!
//! # Responsibilities
//! - Map handler and repository failures to HTTP status codes
//! - Render every error as a `UserResponse` envelope without a user
//!
//! # Design Decisions
//! - The client only ever sees the fixed message; datastore text is
//!   kept on the error for logging

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::UserResponse;
use crate::repository::RepositoryError;

/// Failures surfaced by the user handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not JSON or does not have the user shape.
    #[error("Invalid request body")]
    MalformedInput(#[source] serde_json::Error),

    /// `id` or `name` is empty.
    #[error("ID and Name are required")]
    Validation,

    #[error("User with ID '{0}' already exists")]
    Conflict(String),

    #[error("User with ID '{0}' not found")]
    NotFound(String),

    /// Repository failure. `message` is what the client sees.
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: RepositoryError,
    },

    #[error("Resource not found")]
    NoRoute,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_) | ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) | ApiError::NoRoute => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(UserResponse::message(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("u1".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("u1".into()).status(), StatusCode::NOT_FOUND);

        let err = ApiError::Internal {
            message: "Internal database error",
            source: RepositoryError::Storage("disk full".into()),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_message_hides_source() {
        let err = ApiError::Internal {
            message: "Internal database error",
            source: RepositoryError::Storage("no such table: users".into()),
        };
        assert_eq!(err.to_string(), "Internal database error");
    }
}
