//! Writes audit entries for create, update, and delete operations.
//!
//! An audit write failure never undoes the business change it describes.
//! It is logged at error level and reported back through [`AuditOutcome`].

use std::sync::Arc;

use gatehouse_core::types::{Actor, AuditEntryId};
use gatehouse_entity::audit::{AuditAction, Auditable, FieldMap, NewAuditEntry};
use gatehouse_store::AuditStore;

use super::diff::diff;

/// What happened to the audit entry for a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The entry was appended.
    Written(AuditEntryId),
    /// The update changed no audited field, so nothing was written.
    Skipped,
    /// The mutation was applied but its entry could not be written.
    Failed(String),
}

impl AuditOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A mutation result paired with the fate of its audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audited<T> {
    pub value: T,
    pub audit: AuditOutcome,
}

impl<T> Audited<T> {
    pub fn new(value: T, audit: AuditOutcome) -> Self {
        Self { value, audit }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Appends audit entries to the audit store.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish()
    }
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Records a newly created record. Always written.
    pub async fn record_create<T: Auditable>(&self, actor: Actor, record: &T) -> AuditOutcome {
        self.write(
            actor,
            T::TABLE,
            record.record_id(),
            AuditAction::Create,
            None,
            Some(to_field_map(record)),
        )
        .await
    }

    /// Records an update, or skips it when no audited field changed.
    pub async fn record_update<T: Auditable>(&self, actor: Actor, before: &T, after: &T) -> AuditOutcome {
        let changes = diff(before, after);
        if changes.is_empty() {
            tracing::trace!(table = T::TABLE, record_id = %after.record_id(), "No audited change");
            return AuditOutcome::Skipped;
        }
        self.write(
            actor,
            T::TABLE,
            after.record_id(),
            AuditAction::Update,
            Some(changes.before),
            Some(changes.after),
        )
        .await
    }

    /// Records a deleted record. Always written.
    pub async fn record_delete<T: Auditable>(&self, actor: Actor, record: &T) -> AuditOutcome {
        self.write(
            actor,
            T::TABLE,
            record.record_id(),
            AuditAction::Delete,
            Some(to_field_map(record)),
            None,
        )
        .await
    }

    async fn write(
        &self,
        actor: Actor,
        table: &'static str,
        record_id: String,
        action: AuditAction,
        before: Option<FieldMap>,
        after: Option<FieldMap>,
    ) -> AuditOutcome {
        let entry = NewAuditEntry {
            table_name: table.to_string(),
            record_id,
            actor_id: actor.id(),
            action,
            before,
            after,
        };

        match self.store.create(&entry).await {
            Ok(stored) => AuditOutcome::Written(stored.id),
            Err(e) => {
                tracing::error!(
                    table = table,
                    record_id = %entry.record_id,
                    action = %action,
                    actor = %actor,
                    error = %e,
                    "Audit write failed after the change was applied"
                );
                AuditOutcome::Failed(e.message)
            }
        }
    }
}

fn to_field_map<T: Auditable>(record: &T) -> FieldMap {
    record
        .audit_fields()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
