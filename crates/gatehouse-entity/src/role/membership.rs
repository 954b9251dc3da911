//! User-to-role association.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gatehouse_core::types::{RoleId, UserId};

use crate::audit::Auditable;

/// One row of the many-to-many user/role junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleMembership {
    /// Member.
    pub user_id: UserId,
    /// Role.
    pub role_id: RoleId,
}

impl Auditable for RoleMembership {
    const TABLE: &'static str = "UserRoles";

    fn record_id(&self) -> String {
        format!("{}:{}", self.user_id, self.role_id)
    }

    fn audit_fields(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("UserId", self.user_id.to_string()),
            ("RoleId", self.role_id.to_string()),
        ])
    }
}
