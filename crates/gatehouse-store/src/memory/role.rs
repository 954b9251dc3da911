//! In-memory role and membership store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{RoleId, UserId};
use gatehouse_entity::role::{Role, RoleMembership};

use crate::traits::RoleStore;

#[derive(Debug, Default)]
struct RoleTables {
    roles: HashMap<RoleId, Role>,
    memberships: HashSet<RoleMembership>,
}

/// Roles and the user/role junction under one lock, so that membership
/// changes always see a consistent role table.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    tables: Arc<RwLock<RoleTables>>,
}

impl MemoryRoleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn get_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables.roles.values().find(|r| r.is_named(name)).cloned())
    }

    async fn create(&self, role: &Role) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .roles
            .values()
            .any(|r| r.id == role.id || r.normalized_name == role.normalized_name)
        {
            return Err(AppError::conflict(format!("Role '{}' already exists", role.name)));
        }
        tables.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn add_user_to_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.roles.contains_key(&role_id) {
            return Err(AppError::not_found(format!("Role {role_id} not found")));
        }
        Ok(tables.memberships.insert(RoleMembership { user_id, role_id }))
    }

    async fn remove_user_from_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.memberships.remove(&RoleMembership { user_id, role_id }))
    }

    async fn get_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<Role> = tables
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.roles.get(&m.role_id).cloned())
            .collect();
        roles.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        Ok(roles)
    }

    async fn get_users_for_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        let tables = self.tables.read().await;
        let mut users: Vec<UserId> = tables
            .memberships
            .iter()
            .filter(|m| m.role_id == role_id)
            .map(|m| m.user_id)
            .collect();
        users.sort();
        Ok(users)
    }
}
