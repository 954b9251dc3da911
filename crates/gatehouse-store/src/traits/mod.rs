//! Store traits implemented by persistence adapters.
//!
//! Every method returns [`AppResult`](gatehouse_core::AppResult); adapters
//! convert their own failures into `ErrorKind::Store` and never panic across
//! this boundary.

pub mod attribute;
pub mod audit;
pub mod permission;
pub mod role;
pub mod security;
pub mod user;

pub use attribute::ExtendedAttributeStore;
pub use audit::AuditStore;
pub use permission::PermissionStore;
pub use role::RoleStore;
pub use security::SecurityStore;
pub use user::UserStore;
