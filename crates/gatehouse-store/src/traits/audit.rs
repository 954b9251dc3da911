//! Append-only audit log.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_entity::audit::{AuditEntry, NewAuditEntry};

/// Write side of the audit log. Entries are never updated or deleted.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Append an entry and return it as stored.
    async fn create(&self, entry: &NewAuditEntry) -> AppResult<AuditEntry>;
}
