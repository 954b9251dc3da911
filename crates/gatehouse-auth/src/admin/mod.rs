//! Administration of role memberships, permission grants, and users.

pub mod guard;
pub mod service;

pub use guard::{MembershipChange, check_membership_change};
pub use service::{AdminService, PermissionChanges, UserChanges};
