//! Repository error taxonomy.

use thiserror::Error;

/// Errors produced at the repository boundary.
///
/// Datastore-specific details are flattened into the message; callers
/// branch on the variant only.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Primary-key collision on insert.
    #[error("user with ID '{0}' already exists")]
    DuplicateKey(String),

    /// Any other datastore failure (connection loss, bad statement, ...).
    #[error("storage error: {0}")]
    Storage(String),

    /// Table initialization failed. Fatal at startup.
    #[error("failed to initialize users table: {0}")]
    Schema(String),
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RepositoryError::DuplicateKey(_) => "duplicate_key",
            RepositoryError::Storage(_) => "storage",
            RepositoryError::Schema(_) => "schema",
        }
    }
}
