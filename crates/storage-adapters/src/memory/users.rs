use std::collections::HashMap;

use async_trait::async_trait;
use domains::{DomainError, Result, User, UserRepository};
use tokio::sync::RwLock;

/// Accounts keyed by username. Check-and-insert happens under one write lock.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(DomainError::AlreadyExists(user.username));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }
}
