//! In-memory audit log.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::AuditEntryId;
use gatehouse_entity::audit::{AuditEntry, NewAuditEntry};

use crate::traits::AuditStore;

/// Append-only vector of audit entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditStore {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl MemoryAuditStore {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry in insertion order.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn create(&self, entry: &NewAuditEntry) -> AppResult<AuditEntry> {
        let stored = AuditEntry {
            id: AuditEntryId::new(),
            table_name: entry.table_name.clone(),
            record_id: entry.record_id.clone(),
            actor_id: entry.actor_id,
            action: entry.action,
            before: entry.before.clone(),
            after: entry.after.clone(),
            created_on: Utc::now(),
        };
        self.entries.write().await.push(stored.clone());
        tracing::trace!(
            table = %stored.table_name,
            record_id = %stored.record_id,
            action = %stored.action,
            "Audit entry appended"
        );
        Ok(stored)
    }
}
