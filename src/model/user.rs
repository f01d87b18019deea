//! User record and response envelopes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Primary key. Opaque, must be non-empty.
    #[serde(default)]
    pub id: String,

    /// Display name. Must be non-empty.
    #[serde(default)]
    pub name: String,

    /// Optional contact address, stored as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email,
        }
    }

    /// `true` when both required fields are present.
    pub fn has_required_fields(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

/// Envelope for every `/users` response.
///
/// `user` is omitted from the JSON when absent (errors, not-found).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl UserResponse {
    /// Envelope carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user: None,
        }
    }

    /// Envelope carrying a message and the affected user.
    pub fn with_user(message: impl Into<String>, user: User) -> Self {
        Self {
            message: message.into(),
            user: Some(user),
        }
    }
}

/// Payload of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub message: String,
}

impl Default for HealthCheckResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            message: "user-service is running and the database is reachable".to_string(),
        }
    }
}
