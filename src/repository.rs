//! User Repository
//!
//! In-memory table of users keyed by primary key, standing in for the
//! persistent store behind the cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::models::User;

/// Thread-safe user table, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct UserRepository {
    users: Arc<RwLock<BTreeMap<String, User>>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user with primary key `id`.
    pub async fn find(&self, id: &str) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Inserts `user`, refusing to replace an existing primary key.
    pub async fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(user.id));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    /// Returns all users ordered by primary key.
    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = UserRepository::new();
        repo.insert(User::new("u1", "Ann")).await.unwrap();

        assert_eq!(repo.find("u1").await.unwrap(), User::new("u1", "Ann"));
        assert_eq!(repo.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repo = UserRepository::new();

        let result = repo.find("u2").await;
        assert_eq!(result, Err(RepositoryError::NotFound("u2".to_string())));
    }

    #[tokio::test]
    async fn test_insert_duplicate() {
        let repo = UserRepository::new();
        repo.insert(User::new("u1", "Ann")).await.unwrap();

        let result = repo.insert(User::new("u1", "Bob")).await;
        assert_eq!(result, Err(RepositoryError::Conflict("u1".to_string())));
        assert_eq!(repo.find("u1").await.unwrap().name, "Ann");
    }

    #[tokio::test]
    async fn test_list_ordered_by_id() {
        let repo = UserRepository::new();
        repo.insert(User::new("u2", "Bob")).await.unwrap();
        repo.insert(User::new("u1", "Ann")).await.unwrap();

        let ids: Vec<String> = repo.list().await.into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }
}
