//! Audit log entities.

pub mod auditable;
pub mod model;

pub use auditable::Auditable;
pub use model::{AuditAction, AuditEntry, FieldMap, NewAuditEntry};
