//! User persistence subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → dyn UserRepository (trait object held in AppState)
//!     → sqlite.rs (production, sqlx pool)
//!       or memory.rs (test double, concurrent map)
//!     → RepositoryError (datastore errors classified here, never above)
//! ```
//!
//! # Design Decisions
//! - The pool is injected through the constructor; no global handle
//! - "Not found" is `Ok(None)`, not an error
//! - Duplicate ids are detected from the constraint violation raised by
//!   the insert itself, never by a lookup before the insert

pub mod error;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::model::User;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::InMemoryUserRepository;
pub use sqlite::SqliteUserRepository;

/// Storage contract for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Ensure the users table exists. Safe to call repeatedly.
    async fn init_table(&self) -> RepositoryResult<()>;

    /// Insert a new user. Fails with `DuplicateKey` if the id is taken.
    async fn create(&self, user: &User) -> RepositoryResult<()>;

    /// Fetch a user by id, `None` when no row matches.
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>>;
}
