//! Audit log entry entity model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::types::AuditEntryId;

/// Field name to rendered value.
pub type FieldMap = BTreeMap<String, String>;

/// The kind of change an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// A record was created.
    Create,
    /// A record was updated.
    Update,
    /// A record was deleted.
    Delete,
}

impl AuditAction {
    /// Return the action as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique audit entry identifier.
    pub id: AuditEntryId,
    /// Table of the changed record.
    pub table_name: String,
    /// Identifier of the changed record.
    pub record_id: String,
    /// Who made the change (nil UUID for the system actor).
    pub actor_id: Uuid,
    /// What kind of change.
    pub action: AuditAction,
    /// Field values before the change; absent for creates.
    pub before: Option<FieldMap>,
    /// Field values after the change; absent for deletes.
    pub after: Option<FieldMap>,
    /// When the change was recorded.
    pub created_on: DateTime<Utc>,
}

/// Data required to append an audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    /// Table of the changed record.
    pub table_name: String,
    /// Identifier of the changed record.
    pub record_id: String,
    /// Who made the change.
    pub actor_id: Uuid,
    /// What kind of change.
    pub action: AuditAction,
    /// Field values before the change.
    pub before: Option<FieldMap>,
    /// Field values after the change.
    pub after: Option<FieldMap>,
}
