//! Permission claim persistence.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{PermissionId, RoleId, UserId};
use gatehouse_entity::permission::Permission;

/// Permission records attached to roles or users.
#[async_trait]
pub trait PermissionStore: Send + Sync + 'static {
    /// Find a permission by primary key.
    async fn get_by_id(&self, id: PermissionId) -> AppResult<Option<Permission>>;

    /// Every permission attached to the role.
    async fn get_all_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>>;

    /// Every permission granted directly to the user.
    async fn get_all_direct_for_user(&self, user_id: UserId) -> AppResult<Vec<Permission>>;

    /// Insert a new permission.
    async fn create(&self, permission: &Permission) -> AppResult<()>;

    /// Replace an existing permission. Fails with `NotFound`.
    async fn update(&self, permission: &Permission) -> AppResult<()>;

    /// Delete a permission. Returns `true` if a record was removed.
    async fn delete(&self, id: PermissionId) -> AppResult<bool>;
}
