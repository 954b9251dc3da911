//! Administrative mutations. Each one applies the business change first
//! and then records it; the result carries the audit outcome.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use validator::ValidateEmail;

use gatehouse_core::config::{AccountsConfig, AppConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{Actor, PermissionId, RoleId, UserId};
use gatehouse_entity::permission::{NewPermission, Permission, PermissionOwner, PermissionValue};
use gatehouse_entity::role::{Role, RoleMembership};
use gatehouse_entity::user::{AuthState, User};
use gatehouse_store::{PermissionStore, RoleStore, SecurityStore, Stores, UserStore};

use crate::audit::{AuditOutcome, AuditRecorder, Audited};
use crate::session::Principal;

use super::guard::{MembershipChange, check_membership_change};

/// Editable user fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// Editable permission fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PermissionChanges {
    pub value: Option<PermissionValue>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Role membership, permission grants, and user maintenance.
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserStore>,
    security: Arc<dyn SecurityStore>,
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
    audit: AuditRecorder,
    accounts: AccountsConfig,
}

impl std::fmt::Debug for AdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminService")
            .field("accounts", &self.accounts)
            .finish()
    }
}

impl AdminService {
    pub fn new(stores: &Stores, config: &AppConfig) -> Self {
        Self {
            users: Arc::clone(&stores.users),
            security: Arc::clone(&stores.security),
            roles: Arc::clone(&stores.roles),
            permissions: Arc::clone(&stores.permissions),
            audit: AuditRecorder::new(Arc::clone(&stores.audit)),
            accounts: config.accounts.clone(),
        }
    }

    /// Whether the user currently belongs to the administrator role. Reads
    /// the store rather than token claims, which may be stale.
    pub async fn is_admin(&self, user_id: UserId) -> AppResult<bool> {
        let roles = self.roles.get_roles_for_user(user_id).await?;
        Ok(roles.iter().any(|r| r.is_named(&self.accounts.admin_role)))
    }

    /// Refuses callers outside the administrator role.
    async fn require_admin(&self, caller: &Principal, action: &str) -> AppResult<()> {
        if self.is_admin(caller.user_id).await? {
            return Ok(());
        }
        warn!(
            actor = %caller.user_id,
            action,
            "Administrative action refused: caller is not an administrator"
        );
        Err(AppError::permission_denied(format!("Only administrators may {action}")))
    }

    /// Adds `user_id` to `role_id`. Returns `false` when already a member.
    pub async fn add_user_to_role(
        &self,
        caller: &Principal,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Audited<bool>> {
        let (target, role) = self
            .guard_membership(caller, user_id, role_id, MembershipChange::Add)
            .await?;

        if !self.roles.add_user_to_role(target.id, role.id).await? {
            return Ok(Audited::new(false, AuditOutcome::Skipped));
        }

        let membership = RoleMembership {
            user_id: target.id,
            role_id: role.id,
        };
        let audit = self.audit.record_create(caller.actor(), &membership).await;
        info!(
            actor = %caller.user_id,
            user_id = %target.id,
            role = %role.name,
            "User added to role"
        );
        Ok(Audited::new(true, audit))
    }

    /// Removes `user_id` from `role_id`. Returns `false` when not a member.
    pub async fn remove_user_from_role(
        &self,
        caller: &Principal,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Audited<bool>> {
        let (target, role) = self
            .guard_membership(caller, user_id, role_id, MembershipChange::Remove)
            .await?;

        if !self.roles.remove_user_from_role(target.id, role.id).await? {
            return Ok(Audited::new(false, AuditOutcome::Skipped));
        }

        let membership = RoleMembership {
            user_id: target.id,
            role_id: role.id,
        };
        let audit = self.audit.record_delete(caller.actor(), &membership).await;
        info!(
            actor = %caller.user_id,
            user_id = %target.id,
            role = %role.name,
            "User removed from role"
        );
        Ok(Audited::new(true, audit))
    }

    /// Grants a permission to a role or directly to a user. The same value
    /// may not be granted twice to one owner.
    pub async fn grant_permission(
        &self,
        caller: &Principal,
        new: NewPermission,
    ) -> AppResult<Audited<Permission>> {
        self.require_admin(caller, "grant permissions").await?;

        let existing = self.permissions_of(new.owner).await?;
        if existing.iter().any(|p| p.value == new.value) {
            return Err(AppError::conflict(format!(
                "Permission '{}' is already granted",
                new.value
            )));
        }

        let permission = Permission::from_new(new, caller.actor().id());
        self.permissions.create(&permission).await?;

        let audit = self.audit.record_create(caller.actor(), &permission).await;
        info!(
            actor = %caller.user_id,
            permission_id = %permission.id,
            value = %permission.value,
            "Permission granted"
        );
        Ok(Audited::new(permission, audit))
    }

    /// Edits a permission. An update that changes no audited field writes no
    /// audit entry.
    pub async fn update_permission(
        &self,
        caller: &Principal,
        id: PermissionId,
        changes: PermissionChanges,
    ) -> AppResult<Audited<Permission>> {
        self.require_admin(caller, "edit permissions").await?;

        let before = self
            .permissions
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))?;

        let mut after = before.clone();
        if let Some(value) = changes.value {
            if value != before.value {
                let siblings = self.permissions_of(before.owner).await?;
                if siblings.iter().any(|p| p.id != id && p.value == value) {
                    return Err(AppError::conflict(format!(
                        "Permission '{value}' is already granted"
                    )));
                }
            }
            after.value = value;
        }
        if let Some(display_name) = changes.display_name {
            after.display_name = display_name;
        }
        if let Some(description) = changes.description {
            after.description = Some(description);
        }
        after.modified_on = Utc::now();
        after.modified_by = caller.actor().id();

        self.permissions.update(&after).await?;
        let audit = self.audit.record_update(caller.actor(), &before, &after).await;
        info!(actor = %caller.user_id, permission_id = %id, "Permission updated");
        Ok(Audited::new(after, audit))
    }

    /// Deletes a permission and returns the removed record.
    pub async fn revoke_permission(
        &self,
        caller: &Principal,
        id: PermissionId,
    ) -> AppResult<Audited<Permission>> {
        self.require_admin(caller, "revoke permissions").await?;

        let permission = self
            .permissions
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))?;

        if !self.permissions.delete(id).await? {
            return Err(AppError::not_found(format!("Permission {id} not found")));
        }

        let audit = self.audit.record_delete(caller.actor(), &permission).await;
        info!(
            actor = %caller.user_id,
            permission_id = %id,
            value = %permission.value,
            "Permission revoked"
        );
        Ok(Audited::new(permission, audit))
    }

    /// Edits a user's username, email, or active flag.
    ///
    /// The default administrator is recognised by its username, so that
    /// account cannot be renamed and no other account may take its name.
    pub async fn update_user(
        &self,
        caller: &Principal,
        user_id: UserId,
        changes: UserChanges,
    ) -> AppResult<Audited<User>> {
        self.require_admin(caller, "edit users").await?;

        let before = self.load_user(user_id).await?;
        let mut after = before.clone();

        if let Some(username) = changes.username {
            let username = username.trim();
            if username.is_empty() || username.chars().any(char::is_whitespace) {
                return Err(AppError::validation(
                    "Username must be non-empty and contain no whitespace",
                ));
            }
            let reserved = &self.accounts.default_admin_username;
            let renames_admin = before.username.eq_ignore_ascii_case(reserved)
                && !username.eq_ignore_ascii_case(reserved);
            let takes_admin_name = !before.username.eq_ignore_ascii_case(reserved)
                && username.eq_ignore_ascii_case(reserved);
            if renames_admin || takes_admin_name {
                warn!(
                    actor = %caller.user_id,
                    user_id = %user_id,
                    "Refused rename involving the default administrator"
                );
                return Err(AppError::permission_denied(
                    "The default administrator's username cannot be changed or reused",
                ));
            }
            if let Some(other) = self.users.get_by_username(username).await? {
                if other.id != user_id {
                    return Err(AppError::conflict("Username is already taken"));
                }
            }
            after.username = username.to_string();
        }

        if let Some(email) = changes.email {
            let email = email.trim();
            if !email.validate_email() {
                return Err(AppError::validation("Email address is not valid"));
            }
            if let Some(other) = self.users.get_by_email(email).await? {
                if other.id != user_id {
                    return Err(AppError::conflict("Email is already in use"));
                }
            }
            after.email = email.to_string();
        }

        if let Some(is_active) = changes.is_active {
            after.is_active = is_active;
        }

        after.modified_on = Utc::now();
        after.modified_by = caller.actor().id();
        self.users.update(&after).await?;

        let audit = self.audit.record_update(caller.actor(), &before, &after).await;
        info!(actor = %caller.user_id, user_id = %user_id, "User updated");
        Ok(Audited::new(after, audit))
    }

    /// Returns a locked-out account to Enabled and clears its failure
    /// counter. Returns `false` if the account was not locked out.
    pub async fn unlock_user(&self, actor: Actor, user_id: UserId) -> AppResult<Audited<bool>> {
        let before = self
            .security
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if before.auth_state != AuthState::LockedOut {
            return Ok(Audited::new(false, AuditOutcome::Skipped));
        }

        self.security.set_auth_state(user_id, AuthState::Enabled).await?;
        self.security.reset_failed_attempts(user_id).await?;

        let mut after = before.clone();
        after.auth_state = AuthState::Enabled;
        after.bad_password_attempts = 0;
        after.last_bad_password_on = None;

        let audit = self.audit.record_update(actor, &before, &after).await;
        info!(actor = %actor, user_id = %user_id, "Account unlocked");
        Ok(Audited::new(true, audit))
    }

    async fn guard_membership(
        &self,
        caller: &Principal,
        user_id: UserId,
        role_id: RoleId,
        change: MembershipChange,
    ) -> AppResult<(User, Role)> {
        let target = self.load_user(user_id).await?;
        let role = self
            .roles
            .get_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {role_id} not found")))?;

        let caller_is_admin = self.is_admin(caller.user_id).await?;
        if let Err(e) = check_membership_change(
            &self.accounts,
            caller.user_id,
            caller_is_admin,
            &target,
            &role,
            change,
        ) {
            tracing::warn!(
                actor = %caller.user_id,
                user_id = %target.id,
                role = %role.name,
                reason = %e.message,
                "Role membership change denied"
            );
            return Err(e);
        }
        Ok((target, role))
    }

    async fn load_user(&self, user_id: UserId) -> AppResult<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Permissions of an owner that must exist.
    async fn permissions_of(&self, owner: PermissionOwner) -> AppResult<Vec<Permission>> {
        match owner {
            PermissionOwner::Role(role_id) => {
                if self.roles.get_by_id(role_id).await?.is_none() {
                    return Err(AppError::not_found(format!("Role {role_id} not found")));
                }
                self.permissions.get_all_for_role(role_id).await
            }
            PermissionOwner::User(user_id) => {
                self.load_user(user_id).await?;
                self.permissions.get_all_direct_for_user(user_id).await
            }
        }
    }
}
