use crate::domain::repository::UserRepository;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// In-process credential store. Records are keyed by email, the unique
/// identifier for an account; the auth service checks for an existing
/// email before saving, so an insert here never clobbers another user.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self), fields(user_id = %user.id, email = %user.email))]
    async fn save(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.email.clone(), user);
        debug!("User saved");
        Ok(())
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        let user = users.get(email).cloned();
        if user.is_none() {
            trace!(email = email, "No account for email");
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_find_round_trips() {
        let repo = InMemoryUserRepository::new();
        let alice = user("user-1", "alice@example.com");

        repo.save(alice.clone()).await.unwrap();

        let found = repo
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.name, alice.name);
        assert_eq!(found.password_hash, alice.password_hash);
    }

    #[tokio::test]
    async fn test_unknown_email_returns_none() {
        let repo = InMemoryUserRepository::new();
        let found = repo.find_by_email("nonexistent@example.com").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.save(user("user-2", "Test@Example.com")).await.unwrap();

        assert!(
            repo.find_by_email("Test@Example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            repo.find_by_email("test@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_save_replaces_record_with_same_email() {
        let repo = InMemoryUserRepository::new();
        repo.save(user("user-3", "same@example.com")).await.unwrap();
        repo.save(user("user-4", "same@example.com")).await.unwrap();

        let found = repo
            .find_by_email("same@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "user-4");
    }

    #[tokio::test]
    async fn test_concurrent_saves_all_land() {
        let repo = InMemoryUserRepository::new();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo = repo.clone();
                let u = user(&format!("user-{}", i), &format!("user{}@example.com", i));
                tokio::spawn(async move { repo.save(u).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        for i in 0..10 {
            let found = repo
                .find_by_email(&format!("user{}@example.com", i))
                .await
                .unwrap();
            assert!(found.is_some());
        }
    }
}
