//! Field-level audit diffs and audit entry recording.

pub mod diff;
pub mod recorder;

pub use diff::{AuditDiff, diff, diff_fields};
pub use recorder::{AuditOutcome, AuditRecorder, Audited};
