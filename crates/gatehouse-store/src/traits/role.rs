//! Role and membership persistence.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{RoleId, UserId};
use gatehouse_entity::role::Role;

/// Role records and the user/role junction.
#[async_trait]
pub trait RoleStore: Send + Sync + 'static {
    /// Find a role by primary key.
    async fn get_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Find a role by name (case-insensitive).
    async fn get_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Insert a new role. Fails with `Conflict` on a duplicate name.
    async fn create(&self, role: &Role) -> AppResult<()>;

    /// Add a membership. Returns `false` if it already existed.
    async fn add_user_to_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Remove a membership. Returns `false` if it did not exist.
    async fn remove_user_from_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Every role the user belongs to.
    async fn get_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>>;

    /// Every member of the role.
    async fn get_users_for_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>>;
}
