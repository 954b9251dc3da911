//! Effective permission resolver.
//!
//! Resolution order:
//! 1. Direct grants on the user.
//! 2. Grants on every role the user belongs to.
//!
//! Lookups against a user or role that does not exist yield an empty set.

use std::sync::Arc;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{RoleId, UserId};
use gatehouse_entity::permission::PermissionValue;
use gatehouse_store::{PermissionStore, RoleStore, Stores};

use super::set::PermissionSet;

/// Computes effective permission sets and answers has-permission queries.
#[derive(Clone)]
pub struct PermissionResolver {
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver").finish()
    }
}

impl PermissionResolver {
    /// Creates a resolver over the given stores.
    pub fn new(stores: &Stores) -> Self {
        Self {
            roles: Arc::clone(&stores.roles),
            permissions: Arc::clone(&stores.permissions),
        }
    }

    /// Permissions granted directly to the user.
    pub async fn get_direct_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        Ok(self
            .permissions
            .get_all_direct_for_user(user_id)
            .await?
            .into_iter()
            .collect())
    }

    /// Permissions attached to the role.
    pub async fn get_role_permissions(&self, role_id: RoleId) -> AppResult<PermissionSet> {
        Ok(self
            .permissions
            .get_all_for_role(role_id)
            .await?
            .into_iter()
            .collect())
    }

    /// Union of direct and role-inherited permissions, deduplicated by value.
    pub async fn get_effective_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        let mut effective = self.get_direct_permissions(user_id).await?;
        for role in self.roles.get_roles_for_user(user_id).await? {
            effective.extend(self.permissions.get_all_for_role(role.id).await?);
        }

        tracing::debug!(
            user_id = %user_id,
            count = effective.len(),
            "Resolved effective permissions"
        );
        Ok(effective)
    }

    /// Whether the user holds `value` directly or through any role. Direct
    /// grants are checked first and roles are only consulted on a miss.
    pub async fn has_permission(&self, user_id: UserId, value: &PermissionValue) -> AppResult<bool> {
        let direct = self.permissions.get_all_direct_for_user(user_id).await?;
        if direct.iter().any(|p| &p.value == value) {
            return Ok(true);
        }

        for role in self.roles.get_roles_for_user(user_id).await? {
            if self.role_has_permission(role.id, value).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether the role carries `value`.
    pub async fn role_has_permission(&self, role_id: RoleId, value: &PermissionValue) -> AppResult<bool> {
        let granted = self.permissions.get_all_for_role(role_id).await?;
        Ok(granted.iter().any(|p| &p.value == value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_entity::permission::{NewPermission, Permission, PermissionOwner};
    use gatehouse_entity::role::Role;
    use uuid::Uuid;

    async fn grant(stores: &Stores, owner: PermissionOwner, value: &str) {
        let permission = Permission::from_new(
            NewPermission {
                owner,
                value: value.parse().unwrap(),
                display_name: None,
                description: None,
            },
            Uuid::nil(),
        );
        stores.permissions.create(&permission).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_user_is_empty() {
        let stores = Stores::in_memory();
        let resolver = PermissionResolver::new(&stores);
        let set = resolver.get_effective_permissions(UserId::new()).await.unwrap();
        assert!(set.is_empty());
        let role_set = resolver.get_role_permissions(RoleId::new()).await.unwrap();
        assert!(role_set.is_empty());
    }

    #[tokio::test]
    async fn test_overlap_counted_once() {
        let stores = Stores::in_memory();
        let user = UserId::new();
        let role = Role::new("Support", None, Uuid::nil());
        stores.roles.create(&role).await.unwrap();
        stores.roles.add_user_to_role(user, role.id).await.unwrap();
        grant(&stores, PermissionOwner::User(user), "Tickets.Ticket.Edit").await;
        grant(&stores, PermissionOwner::Role(role.id), "Tickets.Ticket.Edit").await;
        grant(&stores, PermissionOwner::Role(role.id), "Tickets.Ticket.View").await;

        let resolver = PermissionResolver::new(&stores);
        let set = resolver.get_effective_permissions(user).await.unwrap();
        assert_eq!(set.len(), 2);
        let edit = set.get(&"Tickets.Ticket.Edit".parse().unwrap()).unwrap();
        assert_eq!(edit.owner, PermissionOwner::User(user));
    }

    #[tokio::test]
    async fn test_role_has_permission() {
        let stores = Stores::in_memory();
        let role = Role::new("Support", None, Uuid::nil());
        stores.roles.create(&role).await.unwrap();
        grant(&stores, PermissionOwner::Role(role.id), "Tickets.Ticket.Edit").await;

        let resolver = PermissionResolver::new(&stores);
        assert!(resolver
            .role_has_permission(role.id, &"Tickets.Ticket.Edit".parse().unwrap())
            .await
            .unwrap());
        assert!(!resolver
            .role_has_permission(role.id, &"Tickets.Ticket.Delete".parse().unwrap())
            .await
            .unwrap());
    }
}
