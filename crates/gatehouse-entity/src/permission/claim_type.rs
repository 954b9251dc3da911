//! Claim type identifiers written into bearer tokens.
//!
//! A decoded token's claim list is partitioned back into roles and
//! permissions by comparing each entry's type against these constants.

/// Marks a claim as a `Group.Name.Access` permission value.
pub const PERMISSION: &str = "gatehouse/permission";

/// Marks a claim as a role name.
pub const ROLE: &str = "gatehouse/role";
