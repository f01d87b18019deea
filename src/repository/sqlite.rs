//! SQLite-backed user repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::error::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::model::User;
use crate::observability::metrics;
use crate::repository::{RepositoryError, RepositoryResult, UserRepository};

const CREATE_TABLE_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT
)";

const INSERT_USER_SQL: &str = "INSERT INTO users (id, name, email) VALUES (?, ?, ?)";
const SELECT_USER_BY_ID_SQL: &str = "SELECT id, name, email FROM users WHERE id = ?";

/// SQLite extended result codes for key constraint violations.
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

/// Open a connection pool for the configured database.
///
/// Establishes one connection eagerly so an unreachable or unopenable
/// database fails here rather than on the first request.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(config.create_if_missing);

    // Every connection to an in-memory database sees its own empty database,
    // so the pool must hold exactly one long-lived connection.
    let pool = if is_in_memory(&config.url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    tracing::info!(url = %config.url, "Connected to SQLite database");
    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Production repository over an injected `SqlitePool`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn init_table(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Schema(e.to_string()))?;

        tracing::debug!("Users table ready");
        Ok(())
    }

    async fn create(&self, user: &User) -> RepositoryResult<()> {
        let result = sqlx::query(INSERT_USER_SQL)
            .bind(&user.id)
            .bind(&user.name)
            .bind(user.email.as_deref())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                metrics::record_repository_op("create", "ok");
                Ok(())
            }
            Err(e) => {
                let err = classify_insert_error(e, &user.id);
                metrics::record_repository_op("create", err.kind());
                Err(err)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        let result = sqlx::query_as::<_, User>(SELECT_USER_BY_ID_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(found) => {
                let outcome = if found.is_some() { "ok" } else { "not_found" };
                metrics::record_repository_op("find_by_id", outcome);
                Ok(found)
            }
            Err(e) => {
                metrics::record_repository_op("find_by_id", "storage");
                Err(RepositoryError::Storage(format!(
                    "failed to find user by ID '{}': {}",
                    id, e
                )))
            }
        }
    }
}

/// Map an insert failure onto the error taxonomy.
fn classify_insert_error(err: sqlx::Error, id: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if is_key_violation(db_err.as_ref()) {
            return RepositoryError::DuplicateKey(id.to_string());
        }
    }
    RepositoryError::Storage(format!("failed to create user '{}': {}", id, err))
}

fn is_key_violation(err: &dyn DatabaseError) -> bool {
    if err.is_unique_violation() {
        return true;
    }
    matches!(
        err.code().as_deref(),
        Some(SQLITE_CONSTRAINT_PRIMARYKEY) | Some(SQLITE_CONSTRAINT_UNIQUE)
    )
}
