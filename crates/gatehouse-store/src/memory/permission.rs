//! In-memory permission store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{PermissionId, RoleId, UserId};
use gatehouse_entity::permission::{Permission, PermissionOwner};

use crate::traits::PermissionStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryPermissionStore {
    permissions: Arc<DashMap<PermissionId, Permission>>,
}

impl MemoryPermissionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn owned_by(&self, owner: PermissionOwner) -> Vec<Permission> {
        let mut found: Vec<Permission> = self
            .permissions
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| a.created_on.cmp(&b.created_on).then(a.id.cmp(&b.id)));
        found
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn get_by_id(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self.permissions.get(&id).map(|p| p.value().clone()))
    }

    async fn get_all_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        Ok(self.owned_by(PermissionOwner::Role(role_id)))
    }

    async fn get_all_direct_for_user(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
        Ok(self.owned_by(PermissionOwner::User(user_id)))
    }

    async fn create(&self, permission: &Permission) -> AppResult<()> {
        if self.permissions.contains_key(&permission.id) {
            return Err(AppError::conflict(format!(
                "Permission {} already exists",
                permission.id
            )));
        }
        self.permissions.insert(permission.id, permission.clone());
        Ok(())
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        match self.permissions.get_mut(&permission.id) {
            Some(mut existing) => {
                *existing = permission.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "Permission {} not found",
                permission.id
            ))),
        }
    }

    async fn delete(&self, id: PermissionId) -> AppResult<bool> {
        Ok(self.permissions.remove(&id).is_some())
    }
}
