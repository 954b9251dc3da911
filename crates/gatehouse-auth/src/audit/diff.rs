//! Minimal before/after field maps.

use std::collections::BTreeMap;

use gatehouse_entity::audit::{Auditable, FieldMap};

/// The fields that changed between two snapshots of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditDiff {
    pub before: FieldMap,
    pub after: FieldMap,
}

impl AuditDiff {
    /// An empty diff means the update is not worth an audit entry.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Compares the audit fields of two snapshots of the same record.
pub fn diff<T: Auditable>(before: &T, after: &T) -> AuditDiff {
    diff_fields(&before.audit_fields(), &after.audit_fields())
}

/// Compares two field maps by value. A field present on only one side is
/// recorded on that side only.
pub fn diff_fields(
    before: &BTreeMap<&'static str, String>,
    after: &BTreeMap<&'static str, String>,
) -> AuditDiff {
    let mut result = AuditDiff::default();

    for (field, old) in before {
        match after.get(field) {
            Some(new) if new == old => {}
            Some(new) => {
                result.before.insert((*field).to_string(), old.clone());
                result.after.insert((*field).to_string(), new.clone());
            }
            None => {
                result.before.insert((*field).to_string(), old.clone());
            }
        }
    }

    for (field, new) in after {
        if !before.contains_key(field) {
            result.after.insert((*field).to_string(), new.clone());
        }
    }

    result
}
