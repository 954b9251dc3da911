//! Business guards on administrator role membership.
//!
//! - Only an administrator may grant or revoke the administrator role.
//! - An administrator may not revoke their own administrator role.
//! - The default administrator account never loses the administrator role.

use gatehouse_core::error::AppError;
use gatehouse_core::config::AccountsConfig;
use gatehouse_core::types::UserId;
use gatehouse_entity::role::Role;
use gatehouse_entity::user::User;

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Add,
    Remove,
}

/// Checks whether `caller` may apply `change` for `target` in `role`.
/// Changes to roles other than the administrator role always pass.
pub fn check_membership_change(
    accounts: &AccountsConfig,
    caller: UserId,
    caller_is_admin: bool,
    target: &User,
    role: &Role,
    change: MembershipChange,
) -> Result<(), AppError> {
    if !role.is_named(&accounts.admin_role) {
        return Ok(());
    }

    if !caller_is_admin {
        return Err(AppError::permission_denied(
            "Only administrators can change administrator membership",
        ));
    }

    if change == MembershipChange::Remove {
        if target.id == caller {
            return Err(AppError::permission_denied(
                "Cannot remove your own administrator role",
            ));
        }
        if target
            .username
            .eq_ignore_ascii_case(&accounts.default_admin_username)
        {
            return Err(AppError::permission_denied(
                "The default administrator cannot lose the administrator role",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;
    use gatehouse_entity::user::{AccountType, NewUser};
    use uuid::Uuid;

    fn user(name: &str) -> User {
        User::register(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            account_type: AccountType::Human,
        })
    }

    fn denied(result: Result<(), AppError>) -> bool {
        matches!(result, Err(e) if e.kind == ErrorKind::PermissionDenied)
    }

    #[test]
    fn test_other_roles_unrestricted() {
        let accounts = AccountsConfig::default();
        let support = Role::new("Support", None, Uuid::nil());
        let target = user("bob");
        for change in [MembershipChange::Add, MembershipChange::Remove] {
            assert!(
                check_membership_change(&accounts, UserId::new(), false, &target, &support, change)
                    .is_ok()
            );
        }
    }

    #[test]
    fn test_non_admin_cannot_touch_admin_role() {
        let accounts = AccountsConfig::default();
        let admin = Role::new("Administrator", None, Uuid::nil());
        let target = user("bob");
        assert!(denied(check_membership_change(
            &accounts,
            UserId::new(),
            false,
            &target,
            &admin,
            MembershipChange::Add
        )));
        assert!(denied(check_membership_change(
            &accounts,
            UserId::new(),
            false,
            &target,
            &admin,
            MembershipChange::Remove
        )));
    }

    #[test]
    fn test_admin_self_demotion_denied_but_self_grant_allowed() {
        let accounts = AccountsConfig::default();
        let admin = Role::new("Administrator", None, Uuid::nil());
        let me = user("carol");
        assert!(denied(check_membership_change(
            &accounts,
            me.id,
            true,
            &me,
            &admin,
            MembershipChange::Remove
        )));
        assert!(
            check_membership_change(&accounts, me.id, true, &me, &admin, MembershipChange::Add)
                .is_ok()
        );
    }

    #[test]
    fn test_default_admin_protected() {
        let accounts = AccountsConfig::default();
        let admin = Role::new("Administrator", None, Uuid::nil());
        let default_admin = user("admin");
        assert!(denied(check_membership_change(
            &accounts,
            UserId::new(),
            true,
            &default_admin,
            &admin,
            MembershipChange::Remove
        )));
    }
}
