//! Permission claim record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::types::{PermissionId, RoleId, UserId};

use super::claim_type;
use super::value::PermissionValue;
use crate::audit::Auditable;

/// Who a permission record is attached to.
///
/// A record belongs to exactly one role or exactly one user, so the two
/// optional foreign keys of the persisted row collapse into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOwner {
    /// Inherited by every member of the role.
    Role(RoleId),
    /// A direct grant to one user.
    User(UserId),
}

impl PermissionOwner {
    /// Rebuilds the owner from nullable role/user columns.
    pub fn from_columns(role_id: Option<RoleId>, user_id: Option<UserId>) -> Result<Self, AppError> {
        match (role_id, user_id) {
            (Some(role), None) => Ok(Self::Role(role)),
            (None, Some(user)) => Ok(Self::User(user)),
            (Some(_), Some(_)) => Err(AppError::validation(
                "A permission cannot belong to both a role and a user",
            )),
            (None, None) => Err(AppError::validation(
                "A permission must belong to either a role or a user",
            )),
        }
    }

    /// The role column value.
    pub fn role_id(&self) -> Option<RoleId> {
        match self {
            Self::Role(id) => Some(*id),
            Self::User(_) => None,
        }
    }

    /// The user column value.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Role(_) => None,
        }
    }
}

/// A persisted permission claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Unique record identifier.
    pub id: PermissionId,
    /// The role or user this permission is attached to.
    pub owner: PermissionOwner,
    /// Always [`claim_type::PERMISSION`] for permission records.
    pub claim_type: String,
    /// The canonical claim value.
    pub value: PermissionValue,
    /// Human-readable label.
    pub display_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// When the record was created.
    pub created_on: DateTime<Utc>,
    /// Who created the record.
    pub created_by: Uuid,
    /// When the record was last modified.
    pub modified_on: DateTime<Utc>,
    /// Who last modified the record.
    pub modified_by: Uuid,
}

impl Permission {
    /// Materializes a new record from a creation request.
    pub fn from_new(new: NewPermission, created_by: Uuid) -> Self {
        let now = Utc::now();
        let display_name = new
            .display_name
            .unwrap_or_else(|| format!("{} {}", new.value.name(), new.value.access()));
        Self {
            id: PermissionId::new(),
            owner: new.owner,
            claim_type: claim_type::PERMISSION.to_string(),
            value: new.value,
            display_name,
            description: new.description,
            created_on: now,
            created_by,
            modified_on: now,
            modified_by: created_by,
        }
    }

    /// The capability group, taken from the claim value.
    pub fn group(&self) -> &str {
        self.value.group()
    }

    /// The access level, taken from the claim value.
    pub fn access(&self) -> &str {
        self.value.access()
    }
}

impl Auditable for Permission {
    const TABLE: &'static str = "Permissions";

    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_fields(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (
                "RoleId",
                self.owner.role_id().map(|id| id.to_string()).unwrap_or_default(),
            ),
            (
                "UserId",
                self.owner.user_id().map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("ClaimType", self.claim_type.clone()),
            ("ClaimValue", self.value.to_string()),
            ("Name", self.display_name.clone()),
            ("Group", self.value.group().to_string()),
            ("Access", self.value.access().to_string()),
            ("Description", self.description.clone().unwrap_or_default()),
        ])
    }
}

/// Data required to grant a new permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPermission {
    /// Role or user receiving the grant.
    pub owner: PermissionOwner,
    /// The capability being granted.
    pub value: PermissionValue,
    /// Optional label; derived from the value when absent.
    pub display_name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}
