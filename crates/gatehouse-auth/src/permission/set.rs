//! A set of permissions keyed by claim value.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use gatehouse_entity::permission::{Permission, PermissionValue};

/// Permissions deduplicated by `Group.Name.Access` value rather than by
/// record id. When two records carry the same value the first inserted is
/// kept, so inserting direct grants before role grants reports the direct
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    by_value: BTreeMap<PermissionValue, Permission>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a permission. Returns `false` if its value was already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        match self.by_value.entry(permission.value.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(permission);
                true
            }
        }
    }

    pub fn contains(&self, value: &PermissionValue) -> bool {
        self.by_value.contains_key(value)
    }

    pub fn get(&self, value: &PermissionValue) -> Option<&Permission> {
        self.by_value.get(value)
    }

    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }

    /// Claim values in sorted order.
    pub fn values(&self) -> impl Iterator<Item = &PermissionValue> {
        self.by_value.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.by_value.values()
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        for permission in iter {
            self.insert(permission);
        }
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::btree_map::IntoValues<PermissionValue, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_value.into_values()
    }
}
