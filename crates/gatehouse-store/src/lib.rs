//! # gatehouse-store
//!
//! Persistence contracts consumed by the authority core, one narrow trait
//! per capability, plus thread-safe in-memory adapters.
//!
//! ## Modules
//!
//! - `traits`: `UserStore`, `SecurityStore`, `RoleStore`, `PermissionStore`,
//!   `ExtendedAttributeStore`, `AuditStore`
//! - `memory`: in-memory implementations for single-node use and tests

pub mod memory;
pub mod traits;

use std::sync::Arc;

pub use traits::{
    AuditStore, ExtendedAttributeStore, PermissionStore, RoleStore, SecurityStore, UserStore,
};

/// The set of stores the core composes.
#[derive(Clone)]
pub struct Stores {
    /// User records.
    pub users: Arc<dyn UserStore>,
    /// Credential and login bookkeeping.
    pub security: Arc<dyn SecurityStore>,
    /// Roles and memberships.
    pub roles: Arc<dyn RoleStore>,
    /// Permission claims.
    pub permissions: Arc<dyn PermissionStore>,
    /// Extended attributes, including pending lifecycle codes.
    pub attributes: Arc<dyn ExtendedAttributeStore>,
    /// Append-only audit log.
    pub audit: Arc<dyn AuditStore>,
}

impl Stores {
    /// Builds a complete set of fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUserStore::new()),
            security: Arc::new(memory::MemorySecurityStore::new()),
            roles: Arc::new(memory::MemoryRoleStore::new()),
            permissions: Arc::new(memory::MemoryPermissionStore::new()),
            attributes: Arc::new(memory::MemoryAttributeStore::new()),
            audit: Arc::new(memory::MemoryAuditStore::new()),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
