//! In-memory user store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::User;

use crate::traits::UserStore;

/// User records behind a Tokio read/write lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Finds another user already holding `user`'s username or email.
fn find_duplicate(users: &HashMap<UserId, User>, user: &User) -> Option<AppError> {
    users.values().filter(|u| u.id != user.id).find_map(|u| {
        if u.username.eq_ignore_ascii_case(&user.username) {
            Some(AppError::conflict("Username is already taken"))
        } else if u.email.eq_ignore_ascii_case(&user.email) {
            Some(AppError::conflict("Email is already in use"))
        } else {
            None
        }
    })
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AppError::conflict(format!("User {} already exists", user.id)));
        }
        if let Some(err) = find_duplicate(&users, user) {
            return Err(err);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        }
        if let Some(err) = find_duplicate(&users, user) {
            return Err(err);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_core::error::ErrorKind;
    use gatehouse_entity::user::AccountType;

    fn user(username: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: username.to_string(),
            email: email.to_string(),
            email_confirmed: false,
            is_active: false,
            is_deleted: false,
            account_type: AccountType::Human,
            created_on: now,
            created_by: uuid::Uuid::nil(),
            modified_on: now,
            modified_by: uuid::Uuid::nil(),
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = MemoryUserStore::new();
        let alice = user("Alice", "Alice@Example.com");
        store.create(&alice).await.unwrap();
        assert!(store.get_by_username("alice").await.unwrap().is_some());
        assert!(store.get_by_email("alice@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let store = MemoryUserStore::new();
        store.create(&user("alice", "a@x.com")).await.unwrap();
        let err = store.create(&user("ALICE", "b@x.com")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        let err = store.create(&user("bob", "A@X.COM")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = MemoryUserStore::new();
        let err = store.update(&user("ghost", "g@x.com")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
