//! Route handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::model::{HealthCheckResponse, User, UserResponse};
use crate::repository::RepositoryError;

/// `GET /`
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::default())
}

/// `POST /users`
///
/// The body is decoded by hand so any content type is accepted and every
/// decode failure maps to the same 400 envelope.
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user: User = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting malformed user body");
        ApiError::MalformedInput(e)
    })?;

    if !user.has_required_fields() {
        return Err(ApiError::Validation);
    }

    match state.repository.create(&user).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id, "User created");
            Ok((
                StatusCode::CREATED,
                Json(UserResponse::with_user("User created successfully", user)),
            ))
        }
        Err(RepositoryError::DuplicateKey(id)) => {
            tracing::warn!(user_id = %id, "User already exists");
            Err(ApiError::Conflict(id))
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Failed to create user");
            Err(ApiError::Internal {
                message: "Failed to create user due to internal error",
                source: e,
            })
        }
    }
}

/// `GET /users/{user_id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    match state.repository.find_by_id(&user_id).await {
        Ok(Some(user)) => Ok(Json(UserResponse::with_user("User retrieved successfully", user))),
        Ok(None) => Err(ApiError::NotFound(user_id)),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to query user");
            Err(ApiError::Internal {
                message: "Internal database error",
                source: e,
            })
        }
    }
}

/// Fallback for unmatched paths.
pub async fn not_found() -> ApiError {
    ApiError::NoRoute
}
