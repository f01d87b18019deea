//! In-memory user repository.
//!
//! Same contract as the SQLite repository, backed by a `DashMap`. Used as a
//! substitute store in handler tests; `set_unavailable` simulates a
//! datastore outage.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::model::User;
use crate::repository::{RepositoryError, RepositoryResult, UserRepository};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<DashMap<String, User>>,
    unavailable: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the datastore were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of repository calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn check_available(&self) -> RepositoryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("in-memory store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn init_table(&self) -> RepositoryResult<()> {
        self.check_available()
            .map_err(|e| RepositoryError::Schema(e.to_string()))
    }

    async fn create(&self, user: &User) -> RepositoryResult<()> {
        self.check_available()?;

        // Insert-if-vacant under the shard lock; no check-then-insert gap.
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::DuplicateKey(user.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        self.check_available()?;
        Ok(self.users.get(id).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_find() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("u1", "Alice", Some("a@x.com".into()));

        repo.create(&user).await.unwrap();

        assert_eq!(repo.find_by_id("u1").await.unwrap(), Some(user));
        assert_eq!(repo.find_by_id("u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_original() {
        let repo = InMemoryUserRepository::new();
        let original = User::new("u1", "Alice", None);
        repo.create(&original).await.unwrap();

        let err = repo.create(&User::new("u1", "Eve", None)).await.unwrap_err();

        assert!(matches!(err, RepositoryError::DuplicateKey(_)));
        assert_eq!(repo.find_by_id("u1").await.unwrap(), Some(original));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_same_id() {
        let repo = InMemoryUserRepository::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(&User::new("shared", format!("writer-{}", i), None)).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let repo = InMemoryUserRepository::new();
        repo.set_unavailable(true);

        assert!(matches!(
            repo.find_by_id("u1").await,
            Err(RepositoryError::Storage(_))
        ));
        assert!(matches!(
            repo.init_table().await,
            Err(RepositoryError::Schema(_))
        ));
        assert_eq!(repo.call_count(), 2);
    }
}
