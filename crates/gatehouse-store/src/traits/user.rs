//! User record persistence.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::User;

/// Lookup and mutation of user records.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn get_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by username (case-insensitive).
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user. Fails with `Conflict` on a duplicate username or email.
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Replace an existing user. Fails with `NotFound` or `Conflict`.
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Delete a user by primary key. Returns `true` if a record was removed.
    async fn delete(&self, id: UserId) -> AppResult<bool>;
}
