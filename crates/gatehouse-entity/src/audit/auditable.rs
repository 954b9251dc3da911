//! Field snapshots for audit diffs.

use std::collections::BTreeMap;

/// An entity whose changes are recorded in the audit log.
pub trait Auditable {
    /// Table name written to the audit entry.
    const TABLE: &'static str;

    /// Identifier of the audited record.
    fn record_id(&self) -> String;

    /// Every comparable business field, rendered as a string.
    ///
    /// Bookkeeping fields (timestamps, modified-by) are left out so that
    /// touching only them never produces an audit entry.
    fn audit_fields(&self) -> BTreeMap<&'static str, String>;
}
