//! @everyone Exposure Audit
//!
//! Pure per-guild auditing plus the pass orchestration around it.

pub mod auditor;
pub mod error;
pub mod report;
pub mod runner;

pub use auditor::{
    audit_guild, everyone_baseline, AuditOptions, ExposureFinding, ExposureReason,
    DEFAULT_CHANNEL_TYPES,
};
pub use error::AuditError;
pub use report::build_report;
pub use runner::{spawn_audit_task, trigger_audit, AuditRunner};
