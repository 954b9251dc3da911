//! Role entity model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::types::RoleId;

use crate::audit::Auditable;

/// A named group of users that inherits every permission attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Display name.
    pub name: String,
    /// Upper-cased name used for case-insensitive lookups.
    pub normalized_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// When the role was created.
    pub created_on: DateTime<Utc>,
    /// Who created the role.
    pub created_by: Uuid,
    /// When the role was last modified.
    pub modified_on: DateTime<Utc>,
    /// Who last modified the role.
    pub modified_by: Uuid,
}

impl Role {
    /// Builds a new role record attributed to `created_by`.
    pub fn new(name: &str, description: Option<&str>, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: RoleId::new(),
            name: name.to_string(),
            normalized_name: Self::normalize(name),
            description: description.map(String::from),
            created_on: now,
            created_by,
            modified_on: now,
            modified_by: created_by,
        }
    }

    /// The canonical form used for name comparisons.
    pub fn normalize(name: &str) -> String {
        name.trim().to_uppercase()
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.normalized_name == Self::normalize(name)
    }
}

impl Auditable for Role {
    const TABLE: &'static str = "Roles";

    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_fields(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("Name", self.name.clone()),
            ("NormalizedName", self.normalized_name.clone()),
            ("Description", self.description.clone().unwrap_or_default()),
        ])
    }
}
