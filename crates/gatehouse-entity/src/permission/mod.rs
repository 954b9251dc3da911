//! Permission claim entities.

pub mod claim_type;
pub mod model;
pub mod value;

pub use model::{NewPermission, Permission, PermissionOwner};
pub use value::PermissionValue;
