//! In-memory store adapters.
//!
//! Suitable for single-node deployments and tests. Each mutation completes
//! without an await point while holding a lock, so a dropped future never
//! leaves a half-applied change behind.

pub mod attribute;
pub mod audit;
pub mod permission;
pub mod role;
pub mod security;
pub mod user;

pub use attribute::MemoryAttributeStore;
pub use audit::MemoryAuditStore;
pub use permission::MemoryPermissionStore;
pub use role::MemoryRoleStore;
pub use security::MemorySecurityStore;
pub use user::MemoryUserStore;
